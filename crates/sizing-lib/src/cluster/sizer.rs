//! Sizing of one node shape for one workload

use super::{NodeCountResolver, NodeSizer, PodDensityResolver};
use crate::error::Result;
use crate::models::{NodeShape, PodFootprint, SizingResult};
use tracing::trace;

/// Composes pod density and node count into a [`SizingResult`]
#[derive(Debug, Clone, Default)]
pub struct ClusterSizer {
    density: PodDensityResolver,
    node_count: NodeCountResolver,
}

impl ClusterSizer {
    pub fn new(density: PodDensityResolver, node_count: NodeCountResolver) -> Self {
        Self {
            density,
            node_count,
        }
    }
}

impl NodeSizer for ClusterSizer {
    fn size(&self, total_pods: u32, pod: &PodFootprint, node: &NodeShape) -> Result<SizingResult> {
        let pods_per_node = self.density.resolve(pod, node)?;
        let nodes = self.node_count.resolve(total_pods, pods_per_node)?;

        trace!(pods_per_node, nodes, total_pods, "Sized node shape");
        Ok(SizingResult::new(node.clone(), *pod, pods_per_node, nodes))
    }
}
