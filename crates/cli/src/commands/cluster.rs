//! `okdcalc cluster`: rank node shapes for a compute workload

use anyhow::Result;
use colored::Colorize;
use sizing_lib::{validate_sizing_request, NodeShape, SizingRequest, SizingResult};
use std::collections::HashSet;
use tabled::Tabled;

use super::Backend;
use crate::output::{
    color_headroom, format_bytes, format_cpu, print_info, print_results, print_success,
    OutputFormat,
};

#[derive(Tabled)]
struct SizingRow {
    #[tabled(rename = "Score")]
    score: u64,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Nodes")]
    nodes: u32,
    #[tabled(rename = "Pods/Node")]
    pods_per_node: u32,
    #[tabled(rename = "Free Memory")]
    free_memory: String,
    #[tabled(rename = "Free CPU")]
    free_cpu: String,
    #[tabled(rename = "Wasted Memory")]
    wasted_memory: String,
    #[tabled(rename = "Wasted CPU")]
    wasted_cpu: String,
    #[tabled(rename = "Log Headroom")]
    log_headroom: String,
}

impl From<&SizingResult> for SizingRow {
    fn from(result: &SizingResult) -> Self {
        let node = result.node_shape();
        Self {
            score: result.score(),
            node: format!("{} / {} cores", format_bytes(node.memory), node.logical_cores()),
            nodes: result.nodes(),
            pods_per_node: result.pods_per_node(),
            free_memory: format_bytes(result.free_memory()),
            free_cpu: format_cpu(result.free_cpu()),
            wasted_memory: format_bytes(result.wasted_memory()),
            wasted_cpu: format_cpu(result.wasted_cpu()),
            log_headroom: color_headroom(result.wasted_log_events()),
        }
    }
}

/// Size the request and print candidates, best score first
pub async fn size_cluster(backend: &Backend, request: &SizingRequest, format: OutputFormat) -> Result<()> {
    let mut results = match backend {
        Backend::Remote(client) => client.size_cluster(request).await?,
        Backend::Local { cluster, .. } => {
            validate_sizing_request(request)?;
            cluster.rank_request(request)
        }
    };
    results.sort_by_key(SizingResult::score);

    let rows: Vec<SizingRow> = results.iter().map(SizingRow::from).collect();
    print_results(&rows, &results, format)?;

    if format == OutputFormat::Table {
        if let Some(best) = results.first() {
            print_success(&format!(
                "Best: {} nodes of {} with {} pods each",
                best.nodes().to_string().bold(),
                format_bytes(best.node_shape().memory),
                best.pods_per_node()
            ));
        }
        let dropped = infeasible_shapes(&request.node_shapes, &results);
        if dropped > 0 {
            print_info(&format!("{} node shape(s) cannot host this workload", dropped));
        }
    }

    Ok(())
}

/// Distinct requested shapes without a result; repeated shapes count once
fn infeasible_shapes(node_shapes: &[NodeShape], results: &[SizingResult]) -> usize {
    let feasible: HashSet<&NodeShape> = results.iter().map(SizingResult::node_shape).collect();
    node_shapes
        .iter()
        .collect::<HashSet<_>>()
        .difference(&feasible)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sizing_lib::{ClusterRanker, CpuSpec, PodFootprint, GIB};

    #[test]
    fn test_repeated_shapes_are_not_infeasible() {
        let node = NodeShape::new(64 * GIB, CpuSpec::new(1, 8, 16));
        let shapes = vec![node.clone(), node];
        let results = ClusterRanker::new().rank(250, &PodFootprint::new(100, 1024), &shapes);

        assert_eq!(results.len(), 1);
        assert_eq!(infeasible_shapes(&shapes, &results), 0);
    }

    #[test]
    fn test_infeasible_shapes_are_counted_once() {
        let fits = NodeShape::new(64 * GIB, CpuSpec::new(1, 8, 16));
        let tiny = NodeShape::new(GIB, CpuSpec::new(1, 1, 1));
        let shapes = vec![fits, tiny.clone(), tiny];
        let results = ClusterRanker::new().rank(250, &PodFootprint::new(3000, 1024), &shapes);

        assert_eq!(results.len(), 1);
        assert_eq!(infeasible_shapes(&shapes, &results), 1);
    }
}
