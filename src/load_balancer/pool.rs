//! Endpoint pool management.
//!
//! # Responsibilities
//! - Group endpoints by chain, preserving configuration order
//! - Apply the selection strategy to pick a client
//! - Enumerate every endpoint for health sweeps
//!
//! The mapping is written once at construction; afterwards only the endpoints'
//! own state changes, so the pool-level lock is read-only in practice.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::blockchain::client::NodeClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::config::ChainConfig;
use crate::load_balancer::{endpoint::Endpoint, first_healthy::FirstHealthy, LoadBalancer};

/// Chain-keyed endpoint lists plus the selection strategy.
pub struct EndpointPool {
    chains: RwLock<HashMap<ChainId, Vec<Arc<Endpoint>>>>,
    balancer: Box<dyn LoadBalancer>,
}

impl EndpointPool {
    /// Build the pool from configuration entries, one endpoint per entry.
    pub fn new(configs: &[ChainConfig]) -> Self {
        Self::with_balancer(configs, Box::new(FirstHealthy::new()))
    }

    pub fn with_balancer(configs: &[ChainConfig], balancer: Box<dyn LoadBalancer>) -> Self {
        let mut chains: HashMap<ChainId, Vec<Arc<Endpoint>>> = HashMap::new();
        for config in configs {
            let chain_id = ChainId(config.chain_id);
            let endpoint = Arc::new(Endpoint::new(chain_id, config.rpc_url.clone()));
            chains.entry(chain_id).or_default().push(endpoint);
        }

        Self {
            chains: RwLock::new(chains),
            balancer,
        }
    }

    /// Select a client for the given chain.
    pub fn get(&self, chain_id: ChainId) -> BlockchainResult<Arc<dyn NodeClient>> {
        let endpoints = self
            .endpoints(chain_id)
            .ok_or(BlockchainError::NotConfigured(chain_id))?;

        match self.balancer.next_client(&endpoints) {
            Some(client) => Ok(client),
            None => {
                tracing::debug!(chain_id = %chain_id, endpoint_count = endpoints.len(), "No healthy endpoint in chain");
                for ep in &endpoints {
                    tracing::debug!(
                        endpoint = %ep.redacted_address(),
                        error_count = ep.error_count(),
                        "Endpoint status"
                    );
                }
                Err(BlockchainError::Unavailable(chain_id))
            }
        }
    }

    /// Endpoints of one chain in configuration order. `None` if not configured.
    pub fn endpoints(&self, chain_id: ChainId) -> Option<Vec<Arc<Endpoint>>> {
        let chains = self.chains.read().unwrap_or_else(PoisonError::into_inner);
        chains.get(&chain_id).filter(|eps| !eps.is_empty()).cloned()
    }

    /// Return a list of all endpoints (for health checking).
    pub fn all_endpoints(&self) -> Vec<Arc<Endpoint>> {
        let chains = self.chains.read().unwrap_or_else(PoisonError::into_inner);
        chains.values().flat_map(|eps| eps.iter()).cloned().collect()
    }

    /// Configured chain identifiers, sorted.
    pub fn chains(&self) -> Vec<ChainId> {
        let chains = self.chains.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<ChainId> = chains.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for EndpointPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointPool")
            .field("chains", &self.chains())
            .finish_non_exhaustive()
    }
}
