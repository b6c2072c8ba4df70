//! Multi-endpoint node manager.
//!
//! # Responsibilities
//! - Build the endpoint pool from configuration (one endpoint per entry)
//! - Make an initial connection attempt for every endpoint
//! - Own the background health sweep
//! - Hand out a live client per chain: first healthy endpoint in config order
//!
//! Construction never fails. A chain with no reachable endpoint at startup is
//! a degraded but valid state; the sweep keeps retrying it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::blockchain::client::{NodeClient, NodeConnector};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::config::{ChainConfig, HealthCheckConfig};
use crate::health::{HealthMonitor, Prober, SweepSummary};
use crate::load_balancer::pool::EndpointPool;

pub struct NodeManager {
    endpoints: Arc<EndpointPool>,
    monitor: Arc<HealthMonitor>,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl NodeManager {
    /// Build the pool, probe every endpoint once, then start the sweep task.
    ///
    /// The sweep stops when `shutdown` fires (or its sender is dropped).
    pub async fn start(
        chains: &[ChainConfig],
        health: &HealthCheckConfig,
        connector: Arc<dyn NodeConnector>,
        shutdown: broadcast::Receiver<()>,
    ) -> Arc<Self> {
        let endpoints = Arc::new(EndpointPool::new(chains));
        let prober = Prober::new(connector, health);
        let monitor = Arc::new(HealthMonitor::new(endpoints.clone(), prober, health));

        // The initial connection attempt is a full probe, so an endpoint only
        // starts out healthy if it actually answered a height query.
        monitor.sweep().await;
        for endpoint in endpoints.all_endpoints() {
            tracing::info!(
                chain_id = %endpoint.chain_id(),
                endpoint = %endpoint.redacted_address(),
                healthy = endpoint.is_healthy(),
                "Added endpoint"
            );
        }

        let background = monitor.clone();
        let handle = tokio::spawn(async move {
            background.run(shutdown).await;
        });

        Arc::new(Self {
            endpoints,
            monitor,
            scheduler: Mutex::new(Some(handle)),
        })
    }

    /// Select a client for `chain_id` without touching the network.
    pub fn get_client(&self, chain_id: ChainId) -> BlockchainResult<Arc<dyn NodeClient>> {
        self.endpoints.get(chain_id)
    }

    /// Query the current height of `chain_id` through the selected client.
    ///
    /// Selection errors and query errors are returned unchanged.
    pub async fn get_block_height(&self, chain_id: ChainId, deadline: Duration) -> BlockchainResult<u64> {
        let client = self.get_client(chain_id)?;
        match timeout(deadline, client.block_number()).await {
            Ok(result) => result,
            Err(_) => Err(BlockchainError::Timeout(deadline)),
        }
    }

    /// Run one full sweep now, outside the regular schedule.
    pub async fn sweep(&self) -> SweepSummary {
        self.monitor.sweep().await
    }

    /// Configured chain identifiers, sorted.
    pub fn chains(&self) -> Vec<ChainId> {
        self.endpoints.chains()
    }

    /// Wait for the sweep task to exit after shutdown was signalled.
    pub async fn stopped(&self) {
        let handle = self
            .scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Health monitor task failed");
            }
        }
    }
}

impl std::fmt::Debug for NodeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeManager")
            .field("chains", &self.chains())
            .finish_non_exhaustive()
    }
}
