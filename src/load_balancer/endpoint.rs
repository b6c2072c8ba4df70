//! Endpoint abstraction.
//!
//! # Responsibilities
//! - Represent a single configured remote node for one chain
//! - Own the (lazily re-established) client handle
//! - Track health: flag, last latency, last height, consecutive errors
//!
//! Each endpoint carries its own lock, so updating one endpoint never blocks
//! reads or writes on another.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::blockchain::client::{redact_address, NodeClient};
use crate::blockchain::types::ChainId;

/// Atomic view of an endpoint's selectability.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub healthy: bool,
    pub client: Option<Arc<dyn NodeClient>>,
}

impl HealthSnapshot {
    /// The client handle, if the endpoint may be handed out.
    pub fn usable_client(self) -> Option<Arc<dyn NodeClient>> {
        if self.healthy {
            self.client
        } else {
            None
        }
    }
}

/// Mutable per-endpoint state.
#[derive(Debug, Default)]
struct EndpointState {
    client: Option<Arc<dyn NodeClient>>,
    healthy: bool,
    latency: Duration,
    height: u64,
    error_count: u32,
}

/// A single configured node.
#[derive(Debug)]
pub struct Endpoint {
    address: String,
    redacted: String,
    chain_id: ChainId,
    state: RwLock<EndpointState>,
}

impl Endpoint {
    /// Create an endpoint with no client yet and `healthy == false`.
    pub fn new(chain_id: ChainId, address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            redacted: redact_address(&address),
            address,
            chain_id,
            state: RwLock::new(EndpointState::default()),
        }
    }

    /// The configured connection string (may contain credentials).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Connection string safe for logs and metric labels.
    pub fn redacted_address(&self) -> &str {
        &self.redacted
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Read health flag and client handle together.
    pub fn snapshot_health(&self) -> HealthSnapshot {
        let state = self.read();
        HealthSnapshot {
            healthy: state.healthy,
            client: state.client.clone(),
        }
    }

    /// The current client handle, healthy or not.
    pub fn client(&self) -> Option<Arc<dyn NodeClient>> {
        self.read().client.clone()
    }

    /// Install a freshly dialed client.
    pub fn set_client(&self, client: Arc<dyn NodeClient>) {
        self.write().client = Some(client);
    }

    /// Report a successful probe.
    ///
    /// Flips the endpoint healthy and resets the error counter in one step.
    pub fn record_success(&self, latency: Duration, height: u64) {
        let mut state = self.write();
        if state.client.is_none() {
            // A success without a client cannot be handed out; treat as failure.
            state.healthy = false;
            state.error_count = state.error_count.saturating_add(1);
            return;
        }
        state.healthy = true;
        state.latency = latency;
        state.height = height;
        state.error_count = 0;
    }

    /// Report a failed probe. Returns the error count after the increment.
    pub fn record_failure(&self) -> u32 {
        let mut state = self.write();
        state.healthy = false;
        state.error_count = state.error_count.saturating_add(1);
        state.error_count
    }

    pub fn is_healthy(&self) -> bool {
        self.read().healthy
    }

    pub fn error_count(&self) -> u32 {
        self.read().error_count
    }

    /// Latency of the most recent successful probe.
    pub fn latency(&self) -> Duration {
        self.read().latency
    }

    /// Most recently observed chain height.
    pub fn height(&self) -> u64 {
        self.read().height
    }

    // Field updates are single assignments, so a poisoned lock still guards
    // consistent data.
    fn read(&self) -> RwLockReadGuard<'_, EndpointState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EndpointState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
