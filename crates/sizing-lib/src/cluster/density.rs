//! Maximum pod density of one node shape for one pod footprint
//!
//! Memory, CPU and log throughput each bound the number of pods a node can
//! host. The node's own pod cap is the fourth bound; the smallest one wins.

use crate::error::{Result, SizingError};
use crate::models::{NodeShape, PodFootprint, RESERVED_BYTES_PER_POD, RESERVED_MILLICORES_PER_POD};
use tracing::{debug, warn};

/// Resolves how many default pods fit on one node
#[derive(Debug, Clone, Copy, Default)]
pub struct PodDensityResolver;

impl PodDensityResolver {
    pub fn new() -> Self {
        Self
    }

    /// Maximum number of `pod`s one `node` can host
    ///
    /// # Errors
    /// * [`SizingError::InsufficientCpu`] if a single pod plus its reservation
    ///   exceeds the node's millicores
    /// * [`SizingError::InsufficientMemory`] if a single pod plus its
    ///   reservation exceeds the node's memory
    pub fn resolve(&self, pod: &PodFootprint, node: &NodeShape) -> Result<u32> {
        let required_cpu = pod.milli_cores.saturating_add(RESERVED_MILLICORES_PER_POD);
        if required_cpu > node.millicores() {
            warn!(
                required_millicores = required_cpu,
                node_millicores = node.millicores(),
                "Too small nodes for CPU usage of work load"
            );
            return Err(SizingError::InsufficientCpu {
                required: required_cpu,
                available: node.millicores(),
            });
        }

        let required_memory = pod.memory.saturating_add(RESERVED_BYTES_PER_POD);
        if required_memory > node.memory {
            warn!(
                required_bytes = required_memory,
                node_bytes = node.memory,
                "Too small nodes for memory usage of work load"
            );
            return Err(SizingError::InsufficientMemory {
                required: required_memory,
                available: node.memory,
            });
        }

        let max_pods = u64::from(node.max_pods());
        let memory_bound = self.pods_limited_by_memory(pod, node);
        let cpu_bound = self.pods_limited_by_cpu(pod, node);
        let logging_bound = self.pods_limited_by_log_events(pod, node);

        let result = memory_bound.min(cpu_bound).min(logging_bound).min(max_pods);

        debug!(
            result = result,
            memory = memory_bound,
            cpu = cpu_bound,
            logging = logging_bound,
            node = max_pods,
            "Max pods per node"
        );

        Ok(u32::try_from(result).unwrap_or(u32::MAX))
    }

    /// Largest pod count whose memory including the per-pod reservation fits
    pub fn pods_limited_by_memory(&self, pod: &PodFootprint, node: &NodeShape) -> u64 {
        let (pods, iterations) = refine_bound(
            node.memory,
            pod.memory,
            RESERVED_BYTES_PER_POD,
            u64::from(node.max_pods()),
        );

        debug!(iterations, pods, "Memory usage calculation");
        pods
    }

    /// Largest pod count whose millicores including the per-pod reservation fit
    pub fn pods_limited_by_cpu(&self, pod: &PodFootprint, node: &NodeShape) -> u64 {
        let (pods, iterations) = refine_bound(
            node.millicores(),
            pod.milli_cores,
            RESERVED_MILLICORES_PER_POD,
            u64::from(node.max_pods()),
        );

        debug!(iterations, pods, "CPU usage calculation");
        pods
    }

    /// Pods the node's log collector can serve
    ///
    /// Rounded up, so quieter pods allow more of them per node.
    pub fn pods_limited_by_log_events(&self, pod: &PodFootprint, node: &NodeShape) -> u64 {
        let pods = u64::from(node.logging_events_per_second_limit)
            .div_ceil(u64::from(pod.logging_events_per_second));

        debug!(
            pods,
            log_events = pods * u64::from(pod.logging_events_per_second),
            "Logging (fluentd) limit"
        );
        pods
    }
}

/// Start from `capacity / per_pod` (capped at `cap`) and step down until the
/// pods fit including their fixed reservation.
///
/// Returns the pod count and the number of iterations needed.
fn refine_bound(capacity: u64, per_pod: u64, reservation: u64, cap: u64) -> (u64, u32) {
    let mut pods = (capacity / per_pod).min(cap);
    let mut iterations = 1;

    while pods.saturating_mul(per_pod.saturating_add(reservation)) > capacity {
        pods -= 1;
        iterations += 1;
    }

    (pods, iterations)
}
