//! `okdcalc logging`: rank infra node shapes for a logging workload

use anyhow::Result;
use colored::Colorize;
use sizing_lib::{
    logging::MAX_ACTIVE_PRIMARY_SHARDS, validate_logging_request, LoggingSizingRequest,
    LoggingSizingResult,
};
use tabled::Tabled;

use super::Backend;
use crate::output::{format_bytes, format_cpu, print_results, print_success, print_warning, OutputFormat};

#[derive(Tabled)]
struct LoggingRow {
    #[tabled(rename = "Score")]
    score: u64,
    #[tabled(rename = "Infra Node")]
    node: String,
    #[tabled(rename = "Nodes")]
    nodes: u32,
    #[tabled(rename = "Logging Pods")]
    logging_pods: u32,
    #[tabled(rename = "Disk/Pod")]
    disk: String,
    #[tabled(rename = "Memory/Pod")]
    memory: String,
    #[tabled(rename = "CPU/Pod")]
    cpu: String,
}

impl From<&LoggingSizingResult> for LoggingRow {
    fn from(result: &LoggingSizingResult) -> Self {
        let node = result.infra_node_shape();
        Self {
            score: result.score(),
            node: format!("{} / {} cores", format_bytes(node.memory), node.logical_cores()),
            nodes: result.nodes(),
            logging_pods: result.logging_pods(),
            disk: format_bytes(result.disk_per_logging_pod()),
            memory: format_bytes(result.memory_per_logging_pod()),
            cpu: format_cpu(result.cpu_per_logging_pod()),
        }
    }
}

/// Size the request and print candidates, best score first
pub async fn size_logging(backend: &Backend, request: &LoggingSizingRequest, format: OutputFormat) -> Result<()> {
    let mut results = match backend {
        Backend::Remote(client) => client.size_logging(request).await?,
        Backend::Local { logging, .. } => {
            validate_logging_request(request)?;
            logging.rank(request)
        }
    };
    results.sort_by_key(LoggingSizingResult::score);

    let rows: Vec<LoggingRow> = results.iter().map(LoggingRow::from).collect();
    print_results(&rows, &results, format)?;

    if format == OutputFormat::Table {
        if let Some(best) = results.first() {
            print_success(&format!(
                "Best: {} logging pods on {} nodes",
                best.logging_pods().to_string().bold(),
                best.nodes()
            ));
            if best.shard_limit_exceeded() {
                print_warning(&format!(
                    "{} active primary shards exceed the limit of {}",
                    best.active_primary_shards(),
                    MAX_ACTIVE_PRIMARY_SHARDS
                ));
            }
        }
    }

    Ok(())
}
