//! Aggregated log volume of a set of event classes

use crate::models::LogEventClass;
use tracing::{trace, warn};

pub const SECONDS_PER_HOUR: u64 = 3600;

/// 3600 seconds per hour * 24 hours per day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// The maximum number of active primary shards in one logging cluster
pub const MAX_ACTIVE_PRIMARY_SHARDS: u64 = 100_000;

/// Bandwidth, stored bytes and shard count of a logging workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingVolume {
    /// Bytes/s written to the logging cluster (before replication)
    pub disk_bandwidth: u64,
    /// Bytes stored over the retention period, replicas included
    pub total_disk_size: u64,
    pub active_primary_shards: u64,
}

impl LoggingVolume {
    pub fn shard_limit_exceeded(&self) -> bool {
        self.active_primary_shards > MAX_ACTIVE_PRIMARY_SHARDS
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingVolumeModel;

impl LoggingVolumeModel {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, classes: &[LogEventClass], replica_count: u32) -> LoggingVolume {
        LoggingVolume {
            disk_bandwidth: self.disk_bandwidth(classes),
            total_disk_size: self.total_disk_size(classes, replica_count),
            active_primary_shards: self.active_primary_shards(classes),
        }
    }

    /// Bytes/s one event class writes
    ///
    /// Integer arithmetic in the order size * rate / 3600 * containers,
    /// saturating at `u64::MAX`.
    pub fn class_bandwidth(&self, class: &LogEventClass) -> u64 {
        (class.event_size.saturating_mul(class.events_per_hour) / SECONDS_PER_HOUR)
            .saturating_mul(class.container_count)
    }

    pub fn disk_bandwidth(&self, classes: &[LogEventClass]) -> u64 {
        let result = classes
            .iter()
            .map(|c| self.class_bandwidth(c))
            .fold(0u64, u64::saturating_add);

        trace!(bytes_per_second = result, "Logging disk bandwidth");
        result
    }

    /// Bytes stored over each class's retention, times `replica_count + 1` copies
    ///
    /// Saturates at `u64::MAX`; requests are bounded by validation first.
    pub fn total_disk_size(&self, classes: &[LogEventClass], replica_count: u32) -> u64 {
        let copies = u64::from(replica_count) + 1;

        let result = classes
            .iter()
            .map(|c| {
                let bandwidth = self.class_bandwidth(c);
                trace!(
                    retention_days = c.retention_days,
                    replicas = replica_count,
                    bandwidth,
                    "Event class"
                );
                (u64::from(c.retention_days) * SECONDS_PER_DAY)
                    .saturating_mul(bandwidth)
                    .saturating_mul(copies)
            })
            .fold(0u64, u64::saturating_add);

        trace!(bytes = result, "Total disk size");
        result
    }

    /// One primary shard per namespace and retained day
    ///
    /// Exceeding [`MAX_ACTIVE_PRIMARY_SHARDS`] only logs a warning.
    pub fn active_primary_shards(&self, classes: &[LogEventClass]) -> u64 {
        let result: u64 = classes
            .iter()
            .map(|c| u64::from(c.namespace_count) * u64::from(c.retention_days))
            .sum();

        if result > MAX_ACTIVE_PRIMARY_SHARDS {
            warn!(
                shards = result,
                limit = MAX_ACTIVE_PRIMARY_SHARDS,
                "Too much active primary shards"
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_class() -> LogEventClass {
        LogEventClass::new(400, 4000)
            .with_event_size(256)
            .with_events_per_hour(5 * 3600)
            .with_retention_days(28)
    }

    #[test]
    fn test_reference_volume() {
        let model = LoggingVolumeModel::new();
        let volume = model.aggregate(&[reference_class()], 1);

        assert_eq!(volume.disk_bandwidth, 5_120_000);
        assert_eq!(volume.total_disk_size, 28 * 86_400 * 5_120_000 * 2);
        assert_eq!(volume.active_primary_shards, 11_200);
        assert!(!volume.shard_limit_exceeded());
    }

    #[test]
    fn test_bandwidth_truncates_per_hour_rate() {
        let model = LoggingVolumeModel::new();
        let class = LogEventClass::new(1, 10)
            .with_event_size(100)
            .with_events_per_hour(1000);

        // 100 * 1000 / 3600 = 27 (truncated), times 10 containers
        assert_eq!(model.class_bandwidth(&class), 270);
    }

    #[test]
    fn test_classes_are_summed() {
        let model = LoggingVolumeModel::new();
        let quiet = LogEventClass::new(10, 100).with_retention_days(7);
        let classes = [reference_class(), quiet.clone()];

        // defaults: 256 bytes, 3600 events per hour
        assert_eq!(model.class_bandwidth(&quiet), 25_600);
        assert_eq!(model.disk_bandwidth(&classes), 5_120_000 + 25_600);
        assert_eq!(
            model.total_disk_size(&classes, 1),
            28 * 86_400 * 5_120_000 * 2 + 7 * 86_400 * 25_600 * 2
        );
        assert_eq!(model.active_primary_shards(&classes), 11_200 + 70);
    }

    #[test]
    fn test_replicas_multiply_stored_bytes() {
        let model = LoggingVolumeModel::new();
        let single = model.total_disk_size(&[reference_class()], 0);

        assert_eq!(model.total_disk_size(&[reference_class()], 1), 2 * single);
        assert_eq!(model.total_disk_size(&[reference_class()], 2), 3 * single);
    }

    #[test]
    fn test_shard_limit_is_only_flagged() {
        let model = LoggingVolumeModel::new();
        let busy = LogEventClass::new(4000, 4000).with_retention_days(28);
        let volume = model.aggregate(&[busy], 1);

        assert_eq!(volume.active_primary_shards, 112_000);
        assert!(volume.shard_limit_exceeded());
    }

    #[test]
    fn test_oversized_class_saturates() {
        let model = LoggingVolumeModel::new();
        let flood = LogEventClass::new(1, 1_000_000)
            .with_event_size(1 << 32)
            .with_events_per_hour(1 << 32);
        let volume = model.aggregate(&[flood.clone(), flood], 1);

        assert_eq!(volume.disk_bandwidth, u64::MAX);
        assert_eq!(volume.total_disk_size, u64::MAX);
    }

    #[test]
    fn test_no_classes_no_volume() {
        let model = LoggingVolumeModel::new();
        let volume = model.aggregate(&[], 1);

        assert_eq!(volume.disk_bandwidth, 0);
        assert_eq!(volume.total_disk_size, 0);
        assert_eq!(volume.active_primary_shards, 0);
    }
}
