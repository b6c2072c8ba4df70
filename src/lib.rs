//! Multi-endpoint chain RPC gateway library.

pub mod blockchain;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod registry;
pub mod resilience;
pub mod service;

pub use blockchain::{BlockchainError, ChainId, NodeManager};
pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
