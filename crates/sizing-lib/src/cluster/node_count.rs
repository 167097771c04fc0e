//! Minimum node count for a pod total

use crate::error::{Result, SizingError};
use tracing::warn;

/// The maximum number of compute nodes of a cluster
pub const MAX_NODES_PER_CLUSTER: u64 = 2000;

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeCountResolver;

impl NodeCountResolver {
    pub fn new() -> Self {
        Self
    }

    /// `ceil(total_pods / pods_per_node)`, rejected above [`MAX_NODES_PER_CLUSTER`]
    ///
    /// `pods_per_node` must be positive.
    pub fn resolve(&self, total_pods: u32, pods_per_node: u32) -> Result<u32> {
        let nodes = u64::from(total_pods).div_ceil(u64::from(pods_per_node));

        if nodes > MAX_NODES_PER_CLUSTER {
            warn!(nodes, limit = MAX_NODES_PER_CLUSTER, "Too many nodes in cluster");
            return Err(SizingError::ClusterTooLarge {
                nodes,
                limit: MAX_NODES_PER_CLUSTER,
            });
        }

        // bounded by MAX_NODES_PER_CLUSTER above
        Ok(nodes as u32)
    }
}
