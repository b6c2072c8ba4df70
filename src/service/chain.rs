//! Chain queries exposed to the API.

use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::{BlockchainResult, ChainId, NodeManager};

/// Chain use cases. Only talks to the manager's public selection API.
#[derive(Debug, Clone)]
pub struct ChainService {
    nodes: Arc<NodeManager>,
    query_timeout: Duration,
}

impl ChainService {
    pub fn new(nodes: Arc<NodeManager>, query_timeout: Duration) -> Self {
        Self { nodes, query_timeout }
    }

    /// Current block height of `chain_id` from its preferred healthy node.
    pub async fn current_height(&self, chain_id: ChainId) -> BlockchainResult<u64> {
        self.nodes.get_block_height(chain_id, self.query_timeout).await
    }
}
