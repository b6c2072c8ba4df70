//! Single-endpoint liveness check.
//!
//! One probe = dial if no client is held, then fetch the block height, all under
//! one deadline. The outcome is written to the endpoint; failures never escape.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};

use crate::blockchain::client::NodeConnector;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::HealthCheckConfig;
use crate::load_balancer::endpoint::Endpoint;
use crate::observability::metrics;

/// Result of one probe, for sweep bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy { latency: Duration, height: u64 },
    /// `reported` is false once the failure streak passed the warn threshold.
    Failed { error_count: u32, reported: bool },
}

/// Runs liveness checks against endpoints.
pub struct Prober {
    connector: Arc<dyn NodeConnector>,
    timeout: Duration,
    warn_threshold: u32,
}

impl Prober {
    pub fn new(connector: Arc<dyn NodeConnector>, config: &HealthCheckConfig) -> Self {
        Self {
            connector,
            timeout: Duration::from_secs(config.timeout_secs),
            warn_threshold: config.warn_threshold,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe one endpoint and record the result on it.
    pub async fn probe(&self, endpoint: &Endpoint) -> ProbeOutcome {
        let was_healthy = endpoint.is_healthy();
        let start = Instant::now();
        let result = time::timeout(self.timeout, self.check(endpoint)).await;
        let latency = start.elapsed();

        let outcome = match result {
            Ok(Ok(height)) => {
                endpoint.record_success(latency, height);
                if !was_healthy {
                    tracing::info!(
                        chain_id = %endpoint.chain_id(),
                        endpoint = %endpoint.redacted_address(),
                        height,
                        latency = ?latency,
                        "Endpoint healthy"
                    );
                }
                metrics::record_endpoint_height(endpoint, height);
                ProbeOutcome::Healthy { latency, height }
            }
            Ok(Err(e)) => self.fail(endpoint, &e),
            Err(_) => self.fail(endpoint, &BlockchainError::Timeout(self.timeout)),
        };

        metrics::record_probe(endpoint, latency, matches!(outcome, ProbeOutcome::Healthy { .. }));
        outcome
    }

    async fn check(&self, endpoint: &Endpoint) -> BlockchainResult<u64> {
        let client = match endpoint.client() {
            Some(client) => client,
            None => {
                let client = self.connector.connect(endpoint.address()).await?;
                endpoint.set_client(client.clone());
                tracing::debug!(endpoint = %endpoint.redacted_address(), "Client established");
                client
            }
        };
        client.block_number().await
    }

    fn fail(&self, endpoint: &Endpoint, error: &BlockchainError) -> ProbeOutcome {
        let error_count = endpoint.record_failure();
        let reported = error_count <= self.warn_threshold;
        if reported {
            tracing::warn!(
                chain_id = %endpoint.chain_id(),
                endpoint = %endpoint.redacted_address(),
                error_count,
                error = %error,
                "Endpoint unhealthy"
            );
        } else {
            tracing::trace!(
                endpoint = %endpoint.redacted_address(),
                error_count,
                "Endpoint still unhealthy"
            );
        }
        ProbeOutcome::Failed { error_count, reported }
    }
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("timeout", &self.timeout)
            .field("warn_threshold", &self.warn_threshold)
            .finish_non_exhaustive()
    }
}
