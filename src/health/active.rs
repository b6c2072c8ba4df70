//! Active health checking.
//!
//! # Responsibilities
//! - Periodically sweep every endpoint of every chain
//! - Run one probe per endpoint concurrently and join them before the next tick
//! - Stop between ticks when the shutdown signal fires

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::{self, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::probe::{ProbeOutcome, Prober};
use crate::load_balancer::endpoint::Endpoint;
use crate::load_balancer::pool::EndpointPool;

/// Counts from one finished sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub healthy: usize,
    pub unhealthy: usize,
}

pub struct HealthMonitor {
    endpoints: Arc<EndpointPool>,
    prober: Arc<Prober>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(endpoints: Arc<EndpointPool>, prober: Prober, config: &HealthCheckConfig) -> Self {
        Self {
            endpoints,
            prober: Arc::new(prober),
            interval: Duration::from_secs(config.interval_secs),
        }
    }

    /// Sweep every `interval` until shutdown. The first sweep is one interval out.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            probe_timeout_secs = self.prober.timeout().as_secs(),
            "Health monitor starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        // A slow sweep pushes the next tick back instead of bunching ticks up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe all endpoints concurrently and wait for every probe to finish.
    ///
    /// A probe task that panics counts as a failed probe for its endpoint.
    pub async fn sweep(&self) -> SweepSummary {
        let started = Instant::now();
        let mut probes = JoinSet::new();
        let mut in_flight: HashMap<task::Id, Arc<Endpoint>> = HashMap::new();
        for endpoint in self.endpoints.all_endpoints() {
            let prober = self.prober.clone();
            let target = endpoint.clone();
            let handle = probes.spawn(async move { prober.probe(&target).await });
            in_flight.insert(handle.id(), endpoint);
        }

        let mut summary = SweepSummary::default();
        while let Some(joined) = probes.join_next_with_id().await {
            match joined {
                Ok((id, outcome)) => {
                    in_flight.remove(&id);
                    match outcome {
                        ProbeOutcome::Healthy { .. } => summary.healthy += 1,
                        ProbeOutcome::Failed { .. } => summary.unhealthy += 1,
                    }
                }
                Err(e) => {
                    summary.unhealthy += 1;
                    match in_flight.remove(&e.id()) {
                        Some(endpoint) => {
                            let error_count = endpoint.record_failure();
                            tracing::error!(
                                chain_id = %endpoint.chain_id(),
                                endpoint = %endpoint.redacted_address(),
                                error_count,
                                error = %e,
                                "Health probe task failed"
                            );
                        }
                        None => tracing::error!(error = %e, "Health probe task failed"),
                    }
                }
            }
        }

        tracing::debug!(
            healthy = summary.healthy,
            unhealthy = summary.unhealthy,
            elapsed = ?started.elapsed(),
            "Health sweep complete"
        );
        summary
    }
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("endpoints", &self.endpoints)
            .field("prober", &self.prober)
            .field("interval", &self.interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::client::{NodeClient, NodeConnector};
    use crate::blockchain::types::{BlockchainError, BlockchainResult};
    use crate::config::ChainConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Every node answers after `delay`. Addresses containing "down" refuse dials.
    #[derive(Debug)]
    struct SlowNode {
        delay: Duration,
    }

    #[async_trait]
    impl NodeClient for SlowNode {
        fn endpoint(&self) -> &str {
            "slow"
        }

        async fn block_number(&self) -> BlockchainResult<u64> {
            time::sleep(self.delay).await;
            Ok(7)
        }
    }

    struct SlowConnector {
        delay: Duration,
        dials: AtomicUsize,
    }

    #[async_trait]
    impl NodeConnector for SlowConnector {
        async fn connect(&self, address: &str) -> BlockchainResult<Arc<dyn NodeClient>> {
            self.dials.fetch_add(1, Ordering::SeqCst);
            if address.contains("down") {
                return Err(BlockchainError::Connect {
                    address: address.to_string(),
                    reason: "refused".into(),
                });
            }
            Ok(Arc::new(SlowNode { delay: self.delay }))
        }
    }

    fn monitor(urls: &[&str], delay: Duration) -> (HealthMonitor, Arc<SlowConnector>) {
        let chains: Vec<ChainConfig> = urls
            .iter()
            .map(|url| ChainConfig {
                chain_id: 1,
                chain_name: "eth".into(),
                rpc_url: url.to_string(),
            })
            .collect();
        let connector = Arc::new(SlowConnector {
            delay,
            dials: AtomicUsize::new(0),
        });
        let config = HealthCheckConfig::default();
        let prober = Prober::new(connector.clone(), &config);
        let pool = Arc::new(EndpointPool::new(&chains));
        (HealthMonitor::new(pool, prober, &config), connector)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_probes_endpoints_concurrently() {
        let urls = ["http://a", "http://b", "http://c", "http://d"];
        let (monitor, _) = monitor(&urls, Duration::from_secs(2));

        let start = Instant::now();
        let summary = monitor.sweep().await;
        // Four 2s probes in parallel finish together, not after 8s.
        assert!(start.elapsed() < Duration::from_secs(3));
        assert_eq!(summary, SweepSummary { healthy: 4, unhealthy: 0 });
    }

    #[tokio::test]
    async fn test_sweep_counts_failures() {
        let (monitor, _) = monitor(&["http://up", "http://down"], Duration::ZERO);
        let summary = monitor.sweep().await;
        assert_eq!(summary, SweepSummary { healthy: 1, unhealthy: 1 });
    }

    #[derive(Debug)]
    struct CrashingNode;

    #[async_trait]
    impl NodeClient for CrashingNode {
        fn endpoint(&self) -> &str {
            "crash"
        }

        async fn block_number(&self) -> BlockchainResult<u64> {
            panic!("client crashed");
        }
    }

    #[tokio::test]
    async fn test_panicking_check_counts_as_failure() {
        let (monitor, _) = monitor(&["http://a", "http://b"], Duration::ZERO);
        monitor.sweep().await;
        let endpoints = monitor.endpoints.all_endpoints();
        assert!(endpoints.iter().all(|ep| ep.is_healthy()));

        let crashing = endpoints
            .iter()
            .find(|ep| ep.address() == "http://a")
            .unwrap()
            .clone();
        crashing.set_client(Arc::new(CrashingNode));

        let summary = monitor.sweep().await;
        assert_eq!(summary, SweepSummary { healthy: 1, unhealthy: 1 });
        assert!(!crashing.is_healthy());
        assert_eq!(crashing.error_count(), 1);
        assert!(endpoints
            .iter()
            .filter(|ep| ep.address() != "http://a")
            .all(|ep| ep.is_healthy()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_until_shutdown() {
        let (monitor, connector) = monitor(&["http://down"], Duration::ZERO);
        let monitor = Arc::new(monitor);
        let (tx, rx) = broadcast::channel(1);

        let task = {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.run(rx).await })
        };

        // No sweep before the first interval elapses.
        time::sleep(Duration::from_secs(29)).await;
        assert_eq!(connector.dials.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_secs(62)).await;
        assert_eq!(connector.dials.load(Ordering::SeqCst), 3);

        tx.send(()).unwrap();
        task.await.unwrap();

        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(connector.dials.load(Ordering::SeqCst), 3);
    }
}
