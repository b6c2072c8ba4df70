//! Chain-specific types and error definitions.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur while selecting or querying a node.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// The chain has no entry in the pool. Permanent; retrying will not help.
    #[error("chain {0} not configured")]
    NotConfigured(ChainId),

    /// The chain is configured but none of its endpoints is currently healthy.
    #[error("no healthy endpoint available for chain {0}")]
    Unavailable(ChainId),

    /// Could not establish a client for an endpoint.
    #[error("failed to connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    /// RPC request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request did not finish before its deadline.
    #[error("RPC timeout after {0:?}")]
    Timeout(Duration),
}

impl BlockchainError {
    /// True for failures a caller may retry later.
    pub fn is_transient(&self) -> bool {
        !matches!(self, BlockchainError::NotConfigured(_))
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;
