//! Scoring of candidate infra node shapes for a logging workload

use super::{InfraNodeSizer, LoggingNodeSizer};
use crate::models::{LoggingSizingRequest, LoggingSizingResult};
use tracing::debug;

/// Sizes a logging cluster on every infra node shape of a request
///
/// Every shape yields a result; the caller picks the lowest score.
#[derive(Debug, Clone)]
pub struct LoggingRanker<S = LoggingNodeSizer> {
    sizer: S,
}

impl LoggingRanker {
    pub fn new() -> Self {
        Self::with_sizer(LoggingNodeSizer::default())
    }
}

impl Default for LoggingRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: InfraNodeSizer> LoggingRanker<S> {
    pub fn with_sizer(sizer: S) -> Self {
        Self { sizer }
    }

    pub fn sizer(&self) -> &S {
        &self.sizer
    }

    /// The returned results are unordered and free of duplicates
    pub fn rank(&self, request: &LoggingSizingRequest) -> Vec<LoggingSizingResult> {
        let mut results: Vec<LoggingSizingResult> = Vec::with_capacity(request.infra_node_shapes.len());

        for infra_node in &request.infra_node_shapes {
            let result = self.sizer.size(infra_node, request);
            if !results.contains(&result) {
                results.push(result);
            }
        }

        debug!(
            candidates = request.infra_node_shapes.len(),
            results = results.len(),
            az = request.az_count,
            replicas = request.replica_count,
            "Scored infra node shapes"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CpuSpec, LogEventClass, NodeShape, GIB};
    use std::collections::HashSet;

    fn infra_nodes() -> Vec<NodeShape> {
        vec![
            NodeShape::new(64 * GIB, CpuSpec::new(4, 8, 16))
                .with_disk(2048 * GIB, GIB)
                .with_score(1000),
            NodeShape::new(128 * GIB, CpuSpec::new(8, 16, 32))
                .with_disk(4096 * GIB, 3 * GIB)
                .with_score(3000),
            NodeShape::new(256 * GIB, CpuSpec::new(16, 32, 64))
                .with_disk(4096 * GIB, 6 * GIB)
                .with_score(8000),
        ]
    }

    fn request(infra_node_shapes: Vec<NodeShape>) -> LoggingSizingRequest {
        LoggingSizingRequest::new(
            vec![LogEventClass::new(400, 4000)
                .with_event_size(256)
                .with_events_per_hour(5 * 3600)
                .with_retention_days(28)],
            infra_node_shapes,
            30,
        )
        .with_availability_zones(3)
        .with_parallel_users(50)
        .with_replicas(1)
    }

    #[test]
    fn test_scores_every_infra_node_shape() {
        let ranker = LoggingRanker::new();
        let results = ranker.rank(&request(infra_nodes()));

        let scores: HashSet<u64> = results.iter().map(LoggingSizingResult::score).collect();
        assert_eq!(results.len(), 3);
        assert_eq!(scores, HashSet::from([12000, 18000, 48000]));
    }

    #[test]
    fn test_lowest_score_is_the_small_node() {
        let ranker = LoggingRanker::new();
        let results = ranker.rank(&request(infra_nodes()));

        let best = results
            .iter()
            .min_by_key(|r| r.score())
            .unwrap();
        assert_eq!(best.infra_node_shape(), &infra_nodes()[0]);
    }

    #[test]
    fn test_duplicate_shapes_collapse() {
        let ranker = LoggingRanker::new();
        let node = infra_nodes().remove(0);
        let results = ranker.rank(&request(vec![node.clone(), node]));

        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_no_shapes_no_results() {
        let ranker = LoggingRanker::new();
        assert!(ranker.rank(&request(Vec::new())).is_empty());
    }

    struct FixedSizer;

    impl InfraNodeSizer for FixedSizer {
        fn size(&self, infra_node: &NodeShape, _: &LoggingSizingRequest) -> LoggingSizingResult {
            LoggingSizingResult::new(infra_node.clone(), 1, 1, 0, 0, 0, 0)
        }
    }

    #[test]
    fn test_uses_injected_sizer() {
        let ranker = LoggingRanker::with_sizer(FixedSizer);
        let results = ranker.rank(&request(infra_nodes()));

        let scores: HashSet<u64> = results.iter().map(LoggingSizingResult::score).collect();
        assert_eq!(scores, HashSet::from([1000, 3000, 8000]));
    }
}
