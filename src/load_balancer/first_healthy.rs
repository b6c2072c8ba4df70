//! First-healthy selection strategy.

use std::sync::Arc;

use crate::blockchain::client::NodeClient;
use crate::load_balancer::{endpoint::Endpoint, LoadBalancer};

/// Picks the first healthy endpoint in configuration order.
///
/// Operators express preference purely through the order of `[[chains]]`
/// entries; latency and height are not consulted.
#[derive(Debug, Default)]
pub struct FirstHealthy;

impl FirstHealthy {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for FirstHealthy {
    fn next_client(&self, endpoints: &[Arc<Endpoint>]) -> Option<Arc<dyn NodeClient>> {
        endpoints
            .iter()
            .find_map(|endpoint| endpoint.snapshot_health().usable_client())
    }
}
