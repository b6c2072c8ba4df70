//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! [[chains]] config entries
//!     → manager.rs (pool construction, initial probes, sweep task)
//!     → client.rs (dial endpoint, query block height)
//!     → callers get a client handle or a typed error
//! ```
//!
//! # Security Constraints
//! - RPC URLs may embed API keys; only redacted addresses are logged
//! - Every RPC call runs under a deadline
//! - Graceful degradation when a node is unreachable

pub mod client;
pub mod manager;
pub mod types;

pub use client::{AlloyConnector, NodeClient, NodeConnector};
pub use manager::NodeManager;
pub use types::{BlockchainError, BlockchainResult, ChainId};
