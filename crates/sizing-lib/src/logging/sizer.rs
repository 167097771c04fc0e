//! Logging-cluster topology for one infra node shape
//!
//! Disk count is driven by stored bytes, write bandwidth and the number of
//! availability zones. Pod density is driven by memory. Nodes per zone get a
//! floor from the number of compute nodes feeding logs into the cluster.

use super::{InfraNodeSizer, LoggingVolumeModel};
use crate::models::{LoggingSizingRequest, LoggingSizingResult, NodeShape, GIB, MIB};
use tracing::trace;

/// Memory used by a single storage-engine pod; nothing is sized below it
pub const BYTES_PER_LOGGING_POD: u64 = 62 * GIB;

/// Kubelet and operating system reservation plus the log collector (1 GiB)
pub const RESERVED_MEMORY_PER_LOGGING_NODE: u64 = 2 * GIB + 50 * MIB;

/// Kubelet and operating system reservation plus the log collector (500m)
pub const RESERVED_MILLICORES_PER_LOGGING_NODE: u64 = 1050 + 500;

/// Sizes a logging cluster on one infra node shape
///
/// Never rejects a shape; requests are expected to be validated before they
/// get here.
#[derive(Debug, Clone, Default)]
pub struct LoggingNodeSizer {
    volume: LoggingVolumeModel,
}

impl LoggingNodeSizer {
    pub fn new(volume: LoggingVolumeModel) -> Self {
        Self { volume }
    }

    /// Storage-engine pods one node can host by memory, at least one
    pub fn logging_pods_per_node(&self, infra_node: &NodeShape) -> u64 {
        (infra_node.memory / BYTES_PER_LOGGING_POD).max(1)
    }

    /// Logging nodes needed in every availability zone
    pub fn logging_nodes_per_az(
        &self,
        disk_count: u64,
        pods_per_node: u64,
        infra_node: &NodeShape,
        request: &LoggingSizingRequest,
    ) -> u64 {
        let az_count = u64::from(request.az_count);

        trace!(
            disk_count,
            az = az_count,
            max_logging_disks = infra_node.max_logging_disks,
            pods_per_node,
            compute_nodes = request.compute_node_count,
            cpu = infra_node.logical_cores(),
            "Logging nodes per availability zone"
        );

        let mut result = 1;

        if disk_count / az_count / pods_per_node > 1 {
            result += 1;
        }

        let cpu_nodes = u64::from(request.compute_node_count)
            .div_ceil(az_count * u64::from(infra_node.logical_cores()));
        result.max(cpu_nodes.saturating_sub(result))
    }
}

impl InfraNodeSizer for LoggingNodeSizer {
    fn size(&self, infra_node: &NodeShape, request: &LoggingSizingRequest) -> LoggingSizingResult {
        let volume = self
            .volume
            .aggregate(&request.event_classes, request.replica_count);
        let az_count = u64::from(request.az_count);
        let copies = u64::from(request.replica_count) + 1;

        let disks_for_bandwidth = volume
            .disk_bandwidth
            .div_ceil(infra_node.disk_bandwidth)
            .saturating_mul(copies);
        let disks_for_capacity = volume.total_disk_size.div_ceil(infra_node.disk);
        let disk_count = disks_for_capacity.max(disks_for_bandwidth).max(az_count);

        let pods_per_node = self
            .logging_pods_per_node(infra_node)
            .min(disk_count / az_count);
        let nodes_per_az = self.logging_nodes_per_az(disk_count, pods_per_node, infra_node, request);

        trace!(
            nodes_per_az,
            pods_per_node,
            total_disk_size_gib = volume.total_disk_size / GIB,
            memory_gib = infra_node.memory / GIB,
            millicores = infra_node.millicores(),
            "Logging topology"
        );

        let pod_count = az_count * nodes_per_az * pods_per_node;
        let logging_pods = pod_count.max(disk_count);
        let nodes = logging_pods.div_ceil(pods_per_node);

        let memory_per_pod =
            infra_node.memory.saturating_sub(RESERVED_MEMORY_PER_LOGGING_NODE) / pods_per_node;
        let cpu_per_pod = infra_node
            .millicores()
            .saturating_sub(RESERVED_MILLICORES_PER_LOGGING_NODE)
            / pods_per_node;

        LoggingSizingResult::new(
            infra_node.clone(),
            saturating_u32(nodes),
            saturating_u32(logging_pods),
            volume.total_disk_size / disk_count,
            memory_per_pod,
            cpu_per_pod,
            volume.active_primary_shards,
        )
    }
}

fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
