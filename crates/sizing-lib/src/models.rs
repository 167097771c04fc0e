//! Core data models for the sizing calculator
//!
//! Every type here is an immutable value. Results only carry their primary
//! fields; everything else (reservations, free and wasted capacity, score)
//! is computed on access and on serialization, so it can never drift from
//! the values it is derived from.

use serde::{Deserialize, Serialize};

/// One mebibyte in bytes
pub const MIB: u64 = 1024 * 1024;

/// One gibibyte in bytes
pub const GIB: u64 = 1024 * MIB;

/// Memory reserved per pod for the kubelet
pub const KUBELET_BYTES_PER_POD: u64 = 5 * MIB;

/// CPU reserved per pod for the kubelet
pub const KUBELET_MILLICORES_PER_POD: u64 = 5;

/// Memory reserved per pod for the operating system
pub const SYSTEM_BYTES_PER_POD: u64 = 5 * MIB;

/// CPU reserved per pod for the operating system
pub const SYSTEM_MILLICORES_PER_POD: u64 = 5;

/// Memory reserved per pod (kubelet + operating system)
pub const RESERVED_BYTES_PER_POD: u64 = KUBELET_BYTES_PER_POD + SYSTEM_BYTES_PER_POD;

/// CPU reserved per pod (kubelet + operating system)
pub const RESERVED_MILLICORES_PER_POD: u64 = KUBELET_MILLICORES_PER_POD + SYSTEM_MILLICORES_PER_POD;

/// Hard platform limit of pods per node
pub const MAX_PODS_PER_NODE: u32 = 250;

pub const DEFAULT_PODS_PER_CORE: u32 = 10;
pub const DEFAULT_MAX_LOGGING_DISKS: u32 = 1000;

/// Log events per second the node-local log collector can forward
pub const DEFAULT_LOGGING_EVENTS_LIMIT: u32 = 700;
pub const DEFAULT_NODE_SCORE: u64 = 1000;

pub const DEFAULT_POD_LOGGING_EVENTS_PER_SECOND: u32 = 5;

pub const DEFAULT_EVENT_SIZE: u64 = 256;
pub const DEFAULT_EVENTS_PER_HOUR: u64 = 3600;
pub const DEFAULT_RETENTION_DAYS: u32 = 28;

pub const DEFAULT_AVAILABILITY_ZONES: u32 = 2;
pub const DEFAULT_REPLICAS: u32 = 1;

fn default_sockets() -> u32 {
    1
}

fn default_pods_per_core() -> u32 {
    DEFAULT_PODS_PER_CORE
}

fn default_max_logging_disks() -> u32 {
    DEFAULT_MAX_LOGGING_DISKS
}

fn default_logging_events_limit() -> u32 {
    DEFAULT_LOGGING_EVENTS_LIMIT
}

fn default_node_score() -> u64 {
    DEFAULT_NODE_SCORE
}

fn default_pod_logging_events() -> u32 {
    DEFAULT_POD_LOGGING_EVENTS_PER_SECOND
}

fn default_event_size() -> u64 {
    DEFAULT_EVENT_SIZE
}

fn default_events_per_hour() -> u64 {
    DEFAULT_EVENTS_PER_HOUR
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn default_availability_zones() -> u32 {
    DEFAULT_AVAILABILITY_ZONES
}

fn default_replicas() -> u32 {
    DEFAULT_REPLICAS
}

/// Platform release a sizing is calculated for
///
/// Informational only; the calculations are those of OKD 3.11.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformVersion {
    pub major: u32,
    pub minor: u32,
    pub patchlevel: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl Default for PlatformVersion {
    fn default() -> Self {
        Self {
            major: 3,
            minor: 11,
            patchlevel: 0,
            suffix: None,
        }
    }
}

impl std::fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patchlevel)?;
        if let Some(suffix) = &self.suffix {
            write!(f, "-{}", suffix)?;
        }
        Ok(())
    }
}

/// CPU layout of a node shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuSpec {
    #[serde(default = "default_sockets")]
    pub sockets: u32,
    pub cores: u32,
    /// Logical cores (hardware threads) available to the node
    pub logical: u32,
}

impl CpuSpec {
    pub fn new(sockets: u32, cores: u32, logical: u32) -> Self {
        Self {
            sockets,
            cores,
            logical,
        }
    }
}

/// A candidate hardware/VM profile evaluated for cluster membership
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeShape {
    /// RAM in bytes
    pub memory: u64,
    pub cpu: CpuSpec,
    /// Disk capacity in bytes
    #[serde(default)]
    pub disk: u64,
    /// Disk bandwidth available to the logging cluster in bytes/s
    #[serde(default)]
    pub disk_bandwidth: u64,
    #[serde(default = "default_max_logging_disks")]
    pub max_logging_disks: u32,
    #[serde(default = "default_pods_per_core")]
    pub pods_per_core: u32,
    #[serde(default = "default_logging_events_limit")]
    pub logging_events_per_second_limit: u32,
    /// Relative cost of one node of this shape; lower is better
    #[serde(default = "default_node_score")]
    pub score: u64,
}

impl NodeShape {
    pub fn new(memory: u64, cpu: CpuSpec) -> Self {
        Self {
            memory,
            cpu,
            disk: 0,
            disk_bandwidth: 0,
            max_logging_disks: DEFAULT_MAX_LOGGING_DISKS,
            pods_per_core: DEFAULT_PODS_PER_CORE,
            logging_events_per_second_limit: DEFAULT_LOGGING_EVENTS_LIMIT,
            score: DEFAULT_NODE_SCORE,
        }
    }

    pub fn with_disk(mut self, capacity: u64, bandwidth: u64) -> Self {
        self.disk = capacity;
        self.disk_bandwidth = bandwidth;
        self
    }

    pub fn with_max_logging_disks(mut self, disks: u32) -> Self {
        self.max_logging_disks = disks;
        self
    }

    pub fn with_pods_per_core(mut self, pods_per_core: u32) -> Self {
        self.pods_per_core = pods_per_core;
        self
    }

    pub fn with_logging_events_limit(mut self, events_per_second: u32) -> Self {
        self.logging_events_per_second_limit = events_per_second;
        self
    }

    pub fn with_score(mut self, score: u64) -> Self {
        self.score = score;
        self
    }

    pub fn logical_cores(&self) -> u32 {
        self.cpu.logical
    }

    pub fn millicores(&self) -> u64 {
        u64::from(self.cpu.logical) * 1000
    }

    /// Pod capacity of the node: `pods_per_core * logical`, capped at
    /// [`MAX_PODS_PER_NODE`]
    pub fn max_pods(&self) -> u32 {
        self.pods_per_core
            .saturating_mul(self.cpu.logical)
            .min(MAX_PODS_PER_NODE)
    }
}

/// Resource request of one workload unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodFootprint {
    pub milli_cores: u64,
    /// Memory in bytes
    pub memory: u64,
    #[serde(default = "default_pod_logging_events")]
    pub logging_events_per_second: u32,
}

impl PodFootprint {
    pub fn new(milli_cores: u64, memory: u64) -> Self {
        Self {
            milli_cores,
            memory,
            logging_events_per_second: DEFAULT_POD_LOGGING_EVENTS_PER_SECOND,
        }
    }

    pub fn with_logging_events_per_second(mut self, events: u32) -> Self {
        self.logging_events_per_second = events;
        self
    }

    pub fn with_milli_cores(mut self, milli_cores: u64) -> Self {
        self.milli_cores = milli_cores;
        self
    }
}

/// A class of log events sharing size, rate and retention
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEventClass {
    pub namespace_count: u32,
    /// Bytes per event
    #[serde(default = "default_event_size")]
    pub event_size: u64,
    #[serde(default = "default_events_per_hour")]
    pub events_per_hour: u64,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    pub container_count: u64,
}

impl LogEventClass {
    pub fn new(namespace_count: u32, container_count: u64) -> Self {
        Self {
            namespace_count,
            event_size: DEFAULT_EVENT_SIZE,
            events_per_hour: DEFAULT_EVENTS_PER_HOUR,
            retention_days: DEFAULT_RETENTION_DAYS,
            container_count,
        }
    }

    pub fn with_event_size(mut self, bytes: u64) -> Self {
        self.event_size = bytes;
        self
    }

    pub fn with_events_per_hour(mut self, events: u64) -> Self {
        self.events_per_hour = events;
        self
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }
}

/// Compute-cluster sizing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizingRequest {
    pub total_pods: u32,
    pub default_pod: PodFootprint,
    pub node_shapes: Vec<NodeShape>,
    #[serde(default)]
    pub version: PlatformVersion,
}

impl SizingRequest {
    pub fn new(total_pods: u32, default_pod: PodFootprint, node_shapes: Vec<NodeShape>) -> Self {
        Self {
            total_pods,
            default_pod,
            node_shapes,
            version: PlatformVersion::default(),
        }
    }
}

/// Logging-cluster sizing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSizingRequest {
    pub event_classes: Vec<LogEventClass>,
    pub infra_node_shapes: Vec<NodeShape>,
    #[serde(default = "default_availability_zones")]
    pub az_count: u32,
    #[serde(default = "default_replicas")]
    pub replica_count: u32,
    pub compute_node_count: u32,
    /// Concurrent log-viewer users; informational
    #[serde(default)]
    pub parallel_users: u32,
    #[serde(default)]
    pub version: PlatformVersion,
}

impl LoggingSizingRequest {
    pub fn new(
        event_classes: Vec<LogEventClass>,
        infra_node_shapes: Vec<NodeShape>,
        compute_node_count: u32,
    ) -> Self {
        Self {
            event_classes,
            infra_node_shapes,
            az_count: DEFAULT_AVAILABILITY_ZONES,
            replica_count: DEFAULT_REPLICAS,
            compute_node_count,
            parallel_users: 0,
            version: PlatformVersion::default(),
        }
    }

    pub fn with_availability_zones(mut self, az_count: u32) -> Self {
        self.az_count = az_count;
        self
    }

    pub fn with_replicas(mut self, replica_count: u32) -> Self {
        self.replica_count = replica_count;
        self
    }

    pub fn with_parallel_users(mut self, users: u32) -> Self {
        self.parallel_users = users;
        self
    }
}

/// Feasible sizing of one node shape for one pod footprint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SizingResultRecord", into = "SizingResultRecord")]
pub struct SizingResult {
    node_shape: NodeShape,
    default_pod: PodFootprint,
    pods_per_node: u32,
    nodes: u32,
}

impl SizingResult {
    pub(crate) fn new(
        node_shape: NodeShape,
        default_pod: PodFootprint,
        pods_per_node: u32,
        nodes: u32,
    ) -> Self {
        Self {
            node_shape,
            default_pod,
            pods_per_node,
            nodes,
        }
    }

    pub fn node_shape(&self) -> &NodeShape {
        &self.node_shape
    }

    pub fn default_pod(&self) -> &PodFootprint {
        &self.default_pod
    }

    pub fn pods_per_node(&self) -> u32 {
        self.pods_per_node
    }

    pub fn nodes(&self) -> u32 {
        self.nodes
    }

    /// Lower is better
    pub fn score(&self) -> u64 {
        u64::from(self.nodes).saturating_mul(self.node_shape.score)
    }

    pub fn kubelet_memory(&self) -> u64 {
        u64::from(self.pods_per_node) * KUBELET_BYTES_PER_POD
    }

    pub fn kubelet_cpu(&self) -> u64 {
        u64::from(self.pods_per_node) * KUBELET_MILLICORES_PER_POD
    }

    pub fn system_memory(&self) -> u64 {
        u64::from(self.pods_per_node) * SYSTEM_BYTES_PER_POD
    }

    pub fn system_cpu(&self) -> u64 {
        u64::from(self.pods_per_node) * SYSTEM_MILLICORES_PER_POD
    }

    /// Memory left for pods once kubelet and system reservations are taken
    pub fn free_memory(&self) -> u64 {
        self.node_shape
            .memory
            .saturating_sub(self.kubelet_memory() + self.system_memory())
    }

    /// Millicores left for pods once kubelet and system reservations are taken
    pub fn free_cpu(&self) -> u64 {
        self.node_shape
            .millicores()
            .saturating_sub(self.kubelet_cpu() + self.system_cpu())
    }

    /// Memory unused when the node is filled with default pods only
    pub fn wasted_memory(&self) -> u64 {
        self.free_memory()
            .saturating_sub(u64::from(self.pods_per_node) * self.default_pod.memory)
    }

    /// Millicores unused when the node is filled with default pods only
    pub fn wasted_cpu(&self) -> u64 {
        self.free_cpu()
            .saturating_sub(u64::from(self.pods_per_node) * self.default_pod.milli_cores)
    }

    pub fn logging_events_per_node(&self) -> u64 {
        u64::from(self.pods_per_node) * u64::from(self.default_pod.logging_events_per_second)
    }

    /// Spare log collector capacity per node; negative when the rounded-up
    /// logging bound slightly overbooks the collector
    pub fn wasted_log_events(&self) -> i64 {
        i64::from(self.node_shape.logging_events_per_second_limit)
            - self.logging_events_per_node() as i64
    }
}

/// Wire form of [`SizingResult`]; derived values are written out but ignored
/// when reading back
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SizingResultRecord {
    node_shape: NodeShape,
    default_pod: PodFootprint,
    pods_per_node: u32,
    nodes: u32,
    #[serde(skip_deserializing)]
    score: u64,
    #[serde(skip_deserializing)]
    kubelet_memory: u64,
    #[serde(skip_deserializing)]
    kubelet_cpu: u64,
    #[serde(skip_deserializing)]
    system_memory: u64,
    #[serde(skip_deserializing)]
    system_cpu: u64,
    #[serde(skip_deserializing)]
    free_memory: u64,
    #[serde(skip_deserializing)]
    free_cpu: u64,
    #[serde(skip_deserializing)]
    wasted_memory: u64,
    #[serde(skip_deserializing)]
    wasted_cpu: u64,
    #[serde(skip_deserializing)]
    logging_events_per_node: u64,
    #[serde(skip_deserializing)]
    wasted_log_events: i64,
}

impl From<SizingResult> for SizingResultRecord {
    fn from(result: SizingResult) -> Self {
        Self {
            score: result.score(),
            kubelet_memory: result.kubelet_memory(),
            kubelet_cpu: result.kubelet_cpu(),
            system_memory: result.system_memory(),
            system_cpu: result.system_cpu(),
            free_memory: result.free_memory(),
            free_cpu: result.free_cpu(),
            wasted_memory: result.wasted_memory(),
            wasted_cpu: result.wasted_cpu(),
            logging_events_per_node: result.logging_events_per_node(),
            wasted_log_events: result.wasted_log_events(),
            node_shape: result.node_shape,
            default_pod: result.default_pod,
            pods_per_node: result.pods_per_node,
            nodes: result.nodes,
        }
    }
}

impl From<SizingResultRecord> for SizingResult {
    fn from(record: SizingResultRecord) -> Self {
        Self::new(
            record.node_shape,
            record.default_pod,
            record.pods_per_node,
            record.nodes,
        )
    }
}

/// Logging-cluster topology for one infra node shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LoggingSizingResultRecord", into = "LoggingSizingResultRecord")]
pub struct LoggingSizingResult {
    infra_node_shape: NodeShape,
    nodes: u32,
    logging_pods: u32,
    disk_per_logging_pod: u64,
    memory_per_logging_pod: u64,
    cpu_per_logging_pod: u64,
    active_primary_shards: u64,
}

impl LoggingSizingResult {
    pub(crate) fn new(
        infra_node_shape: NodeShape,
        nodes: u32,
        logging_pods: u32,
        disk_per_logging_pod: u64,
        memory_per_logging_pod: u64,
        cpu_per_logging_pod: u64,
        active_primary_shards: u64,
    ) -> Self {
        Self {
            infra_node_shape,
            nodes,
            logging_pods,
            disk_per_logging_pod,
            memory_per_logging_pod,
            cpu_per_logging_pod,
            active_primary_shards,
        }
    }

    pub fn infra_node_shape(&self) -> &NodeShape {
        &self.infra_node_shape
    }

    pub fn nodes(&self) -> u32 {
        self.nodes
    }

    pub fn logging_pods(&self) -> u32 {
        self.logging_pods
    }

    /// Bytes
    pub fn disk_per_logging_pod(&self) -> u64 {
        self.disk_per_logging_pod
    }

    /// Bytes
    pub fn memory_per_logging_pod(&self) -> u64 {
        self.memory_per_logging_pod
    }

    /// Millicores
    pub fn cpu_per_logging_pod(&self) -> u64 {
        self.cpu_per_logging_pod
    }

    pub fn active_primary_shards(&self) -> u64 {
        self.active_primary_shards
    }

    /// Lower is better
    pub fn score(&self) -> u64 {
        u64::from(self.logging_pods).saturating_mul(self.infra_node_shape.score)
    }

    pub fn shard_limit_exceeded(&self) -> bool {
        self.active_primary_shards > crate::logging::MAX_ACTIVE_PRIMARY_SHARDS
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoggingSizingResultRecord {
    infra_node_shape: NodeShape,
    nodes: u32,
    logging_pods: u32,
    disk_per_logging_pod: u64,
    memory_per_logging_pod: u64,
    cpu_per_logging_pod: u64,
    active_primary_shards: u64,
    #[serde(skip_deserializing)]
    score: u64,
    #[serde(skip_deserializing)]
    shard_limit_exceeded: bool,
}

impl From<LoggingSizingResult> for LoggingSizingResultRecord {
    fn from(result: LoggingSizingResult) -> Self {
        Self {
            score: result.score(),
            shard_limit_exceeded: result.shard_limit_exceeded(),
            infra_node_shape: result.infra_node_shape,
            nodes: result.nodes,
            logging_pods: result.logging_pods,
            disk_per_logging_pod: result.disk_per_logging_pod,
            memory_per_logging_pod: result.memory_per_logging_pod,
            cpu_per_logging_pod: result.cpu_per_logging_pod,
            active_primary_shards: result.active_primary_shards,
        }
    }
}

impl From<LoggingSizingResultRecord> for LoggingSizingResult {
    fn from(record: LoggingSizingResultRecord) -> Self {
        Self::new(
            record.infra_node_shape,
            record.nodes,
            record.logging_pods,
            record.disk_per_logging_pod,
            record.memory_per_logging_pod,
            record.cpu_per_logging_pod,
            record.active_primary_shards,
        )
    }
}
