//! Scoring of candidate node shapes for a compute workload

use super::{ClusterSizer, NodeSizer};
use crate::error::SizingError;
use crate::models::{NodeShape, PodFootprint, SizingRequest, SizingResult};
use tracing::{debug, warn};

/// A candidate that could not host the workload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub node_shape: NodeShape,
    pub error: SizingError,
}

/// Feasible results plus the candidates that were dropped
#[derive(Debug, Clone, Default)]
pub struct CandidateEvaluation {
    pub results: Vec<SizingResult>,
    pub rejected: Vec<Rejection>,
}

/// Evaluates every candidate node shape independently
///
/// Infeasible shapes are dropped; an empty result means no candidate
/// satisfies the workload.
#[derive(Debug, Clone)]
pub struct ClusterRanker<S = ClusterSizer> {
    sizer: S,
}

impl ClusterRanker {
    pub fn new() -> Self {
        Self::with_sizer(ClusterSizer::default())
    }
}

impl Default for ClusterRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: NodeSizer> ClusterRanker<S> {
    pub fn with_sizer(sizer: S) -> Self {
        Self { sizer }
    }

    pub fn sizer(&self) -> &S {
        &self.sizer
    }

    /// Score all `node_shapes` for `total_pods` copies of `pod`
    ///
    /// The returned results are unordered and free of duplicates.
    pub fn rank(&self, total_pods: u32, pod: &PodFootprint, node_shapes: &[NodeShape]) -> Vec<SizingResult> {
        self.evaluate(total_pods, pod, node_shapes).results
    }

    pub fn rank_request(&self, request: &SizingRequest) -> Vec<SizingResult> {
        self.rank(request.total_pods, &request.default_pod, &request.node_shapes)
    }

    /// Like [`rank`](Self::rank), but also reports why candidates were dropped
    pub fn evaluate(
        &self,
        total_pods: u32,
        pod: &PodFootprint,
        node_shapes: &[NodeShape],
    ) -> CandidateEvaluation {
        let mut evaluation = CandidateEvaluation::default();

        for node_shape in node_shapes {
            match self.sizer.size(total_pods, pod, node_shape) {
                Ok(result) => {
                    if !evaluation.results.contains(&result) {
                        evaluation.results.push(result);
                    }
                }
                Err(error) => {
                    warn!(
                        reason = error.reason(),
                        memory = node_shape.memory,
                        logical_cores = node_shape.logical_cores(),
                        score = node_shape.score,
                        "No solution for node shape: {}",
                        error
                    );
                    evaluation.rejected.push(Rejection {
                        node_shape: node_shape.clone(),
                        error,
                    });
                }
            }
        }

        debug!(
            candidates = node_shapes.len(),
            feasible = evaluation.results.len(),
            rejected = evaluation.rejected.len(),
            "Scored node shapes"
        );
        evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::{CpuSpec, GIB};
    use std::collections::HashSet;

    fn default_node() -> NodeShape {
        NodeShape::new(64 * GIB, CpuSpec::new(1, 8, 16))
            .with_disk(2048 * GIB, GIB)
            .with_max_logging_disks(8)
            .with_pods_per_core(10)
    }

    fn big_node() -> NodeShape {
        NodeShape::new(256 * GIB, CpuSpec::new(4, 32, 64))
            .with_disk(2048 * GIB, GIB)
            .with_max_logging_disks(8)
            .with_pods_per_core(10)
            .with_score(5000)
    }

    fn small_node() -> NodeShape {
        NodeShape::new(2 * GIB, CpuSpec::new(1, 1, 2))
            .with_disk(2048 * GIB, GIB)
            .with_max_logging_disks(8)
            .with_pods_per_core(10)
            .with_score(200)
    }

    fn node_shapes() -> Vec<NodeShape> {
        vec![small_node(), default_node(), big_node()]
    }

    fn normal_pod() -> PodFootprint {
        PodFootprint::new(100, 1024)
    }

    fn scores(results: &[SizingResult]) -> HashSet<u64> {
        results.iter().map(SizingResult::score).collect()
    }

    #[test]
    fn test_scores_all_three_valid_node_shapes() {
        let ranker = ClusterRanker::new();
        let results = ranker.rank(250, &normal_pod(), &node_shapes());

        assert_eq!(results.len(), 3);
        assert_eq!(scores(&results), HashSet::from([2 * 1000, 2 * 5000, 14 * 200]));
    }

    #[test]
    fn test_drops_node_shape_without_solution() {
        let ranker = ClusterRanker::new();
        let pod = normal_pod().with_milli_cores(3000);
        let results = ranker.rank(250, &pod, &node_shapes());

        assert_eq!(results.len(), 2);
        assert_eq!(scores(&results), HashSet::from([50 * 1000, 12 * 5000]));
    }

    #[test]
    fn test_evaluate_reports_rejections() {
        let ranker = ClusterRanker::new();
        let pod = normal_pod().with_milli_cores(3000);
        let evaluation = ranker.evaluate(250, &pod, &node_shapes());

        assert_eq!(evaluation.results.len(), 2);
        assert_eq!(evaluation.rejected.len(), 1);
        assert_eq!(evaluation.rejected[0].node_shape, small_node());
        assert_eq!(evaluation.rejected[0].error.reason(), "insufficient_cpu");
    }

    #[test]
    fn test_empty_when_nothing_fits() {
        let ranker = ClusterRanker::new();
        let results = ranker.rank(250, &PodFootprint::new(100_000, 1024), &node_shapes());

        assert!(results.is_empty());
    }

    #[test]
    fn test_duplicate_shapes_collapse() {
        let ranker = ClusterRanker::new();
        let results = ranker.rank(250, &normal_pod(), &[default_node(), default_node()]);

        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let ranker = ClusterRanker::new();
        let first = ranker.rank(250, &normal_pod(), &node_shapes());
        let second = ranker.rank(250, &normal_pod(), &node_shapes());

        let first: HashSet<_> = first.into_iter().collect();
        let second: HashSet<_> = second.into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_of_candidates_is_irrelevant() {
        let ranker = ClusterRanker::new();
        let mut reversed = node_shapes();
        reversed.reverse();

        let forward: HashSet<_> = ranker.rank(250, &normal_pod(), &node_shapes()).into_iter().collect();
        let backward: HashSet<_> = ranker.rank(250, &normal_pod(), &reversed).into_iter().collect();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_rank_request() {
        let ranker = ClusterRanker::new();
        let request = SizingRequest::new(250, normal_pod(), node_shapes());

        assert_eq!(ranker.rank_request(&request).len(), 3);
    }

    struct AlwaysTooLarge;

    impl NodeSizer for AlwaysTooLarge {
        fn size(&self, _: u32, _: &PodFootprint, _: &NodeShape) -> Result<SizingResult> {
            Err(SizingError::ClusterTooLarge { nodes: 2001, limit: 2000 })
        }
    }

    #[test]
    fn test_uses_injected_sizer() {
        let ranker = ClusterRanker::with_sizer(AlwaysTooLarge);
        let evaluation = ranker.evaluate(250, &normal_pod(), &node_shapes());

        assert!(evaluation.results.is_empty());
        assert_eq!(evaluation.rejected.len(), 3);
    }
}
