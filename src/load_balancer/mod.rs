//! Endpoint selection subsystem.
//!
//! # Data Flow
//! ```text
//! get_client(chain_id)
//!     → pool.rs (look up the chain's ordered endpoint list)
//!     → first_healthy.rs (scan in configuration order)
//!     → endpoint.rs (atomic health + client snapshot per endpoint)
//!     → Return client handle or error
//! ```
//!
//! # Design Decisions
//! - Selection reads in-memory state only; it never waits on the network
//! - Per-endpoint locks; no lock spans more than one endpoint
//! - Unhealthy endpoints are skipped, never evicted

use std::sync::Arc;

use crate::blockchain::client::NodeClient;

pub mod endpoint;
pub mod first_healthy;
pub mod pool;

pub use endpoint::{Endpoint, HealthSnapshot};
pub use first_healthy::FirstHealthy;
pub use pool::EndpointPool;

/// Strategy for choosing a client among one chain's endpoints.
pub trait LoadBalancer: Send + Sync {
    /// Pick a client, or `None` if no endpoint is usable.
    fn next_client(&self, endpoints: &[Arc<endpoint::Endpoint>]) -> Option<Arc<dyn NodeClient>>;
}
