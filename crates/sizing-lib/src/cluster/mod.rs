//! Compute-cluster sizing
//!
//! This module provides:
//! - Pod density per node shape (memory, CPU and log-throughput bounds)
//! - Node count per workload with the platform node limit
//! - Ranking of candidate node shapes by score

mod density;
mod node_count;
mod ranker;
mod sizer;

pub use density::PodDensityResolver;
pub use node_count::{NodeCountResolver, MAX_NODES_PER_CLUSTER};
pub use ranker::{CandidateEvaluation, ClusterRanker, Rejection};
pub use sizer::ClusterSizer;

use crate::error::Result;
use crate::models::{NodeShape, PodFootprint, SizingResult};

/// Trait for sizing one node shape against a workload
pub trait NodeSizer: Send + Sync {
    /// Size a cluster of `node` shaped nodes for `total_pods` copies of `pod`
    fn size(&self, total_pods: u32, pod: &PodFootprint, node: &NodeShape) -> Result<SizingResult>;
}
