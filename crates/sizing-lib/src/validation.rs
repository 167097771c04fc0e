//! Boundary checks for sizing requests
//!
//! Calculators assume positive inputs. Every request that enters through the
//! HTTP service or the CLI goes through these checks first.

use crate::error::ValidationError;
use crate::logging::{SECONDS_PER_DAY, SECONDS_PER_HOUR};
use crate::models::{
    LogEventClass, LoggingSizingRequest, NodeShape, SizingRequest, RESERVED_BYTES_PER_POD,
    RESERVED_MILLICORES_PER_POD,
};

type Result = std::result::Result<(), ValidationError>;

fn positive(value: u64, field: impl FnOnce() -> String) -> Result {
    if value == 0 {
        return Err(ValidationError::not_positive(field()));
    }
    Ok(())
}

fn fits(
    value: Option<u64>,
    field: impl FnOnce() -> String,
) -> std::result::Result<u64, ValidationError> {
    value.ok_or_else(|| ValidationError::too_large(field()))
}

/// Bytes/s one event class writes, `None` once it leaves `u64`
fn class_bandwidth(class: &LogEventClass) -> Option<u64> {
    (class.event_size.checked_mul(class.events_per_hour)? / SECONDS_PER_HOUR)
        .checked_mul(class.container_count)
}

fn validate_node_shape(node: &NodeShape, path: &str) -> Result {
    positive(node.memory, || format!("{path}.memory"))?;
    positive(node.cpu.logical.into(), || format!("{path}.cpu.logical"))?;
    positive(node.pods_per_core.into(), || format!("{path}.podsPerCore"))?;
    positive(node.logging_events_per_second_limit.into(), || {
        format!("{path}.loggingEventsPerSecondLimit")
    })?;
    Ok(())
}

/// Check a compute sizing request
///
/// An empty `nodeShapes` list is valid and ranks to an empty result.
pub fn validate_sizing_request(request: &SizingRequest) -> Result {
    positive(request.total_pods.into(), || "totalPods".to_string())?;

    let pod = &request.default_pod;
    positive(pod.milli_cores, || "defaultPod.milliCores".to_string())?;
    fits(pod.milli_cores.checked_add(RESERVED_MILLICORES_PER_POD), || {
        "defaultPod.milliCores".to_string()
    })?;
    positive(pod.memory, || "defaultPod.memory".to_string())?;
    fits(pod.memory.checked_add(RESERVED_BYTES_PER_POD), || {
        "defaultPod.memory".to_string()
    })?;
    positive(pod.logging_events_per_second.into(), || {
        "defaultPod.loggingEventsPerSecond".to_string()
    })?;

    for (i, node) in request.node_shapes.iter().enumerate() {
        validate_node_shape(node, &format!("nodeShapes[{i}]"))?;
    }
    Ok(())
}

/// Check a logging sizing request
///
/// Event classes are rejected when their combined volume no longer fits in
/// `u64` bytes.
pub fn validate_logging_request(request: &LoggingSizingRequest) -> Result {
    positive(request.az_count.into(), || "azCount".to_string())?;

    let copies = u64::from(request.replica_count) + 1;
    let mut written: u64 = 0;
    let mut stored: u64 = 0;
    for (i, class) in request.event_classes.iter().enumerate() {
        let path = || format!("eventClasses[{i}]");
        let bandwidth = fits(class_bandwidth(class), path)?;
        let disk_size = fits(
            (u64::from(class.retention_days) * SECONDS_PER_DAY)
                .checked_mul(bandwidth)
                .and_then(|bytes| bytes.checked_mul(copies)),
            path,
        )?;

        written = fits(
            bandwidth
                .checked_mul(copies)
                .and_then(|bytes| written.checked_add(bytes)),
            || "eventClasses".to_string(),
        )?;
        stored = fits(stored.checked_add(disk_size), || "eventClasses".to_string())?;
    }

    for (i, node) in request.infra_node_shapes.iter().enumerate() {
        let path = format!("infraNodeShapes[{i}]");
        validate_node_shape(node, &path)?;
        positive(node.disk, || format!("{path}.disk"))?;
        positive(node.disk_bandwidth, || format!("{path}.diskBandwidth"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CpuSpec, LogEventClass, PodFootprint, GIB};

    fn node() -> NodeShape {
        NodeShape::new(64 * GIB, CpuSpec::new(1, 8, 16)).with_disk(2048 * GIB, GIB)
    }

    fn sizing_request() -> SizingRequest {
        SizingRequest::new(250, PodFootprint::new(100, 1024), vec![node()])
    }

    fn logging_request() -> LoggingSizingRequest {
        LoggingSizingRequest::new(vec![LogEventClass::new(10, 100)], vec![node()], 3)
    }

    #[test]
    fn test_valid_requests_pass() {
        assert!(validate_sizing_request(&sizing_request()).is_ok());
        assert!(validate_logging_request(&logging_request()).is_ok());
    }

    #[test]
    fn test_empty_candidate_list_is_valid() {
        let request = SizingRequest {
            node_shapes: Vec::new(),
            ..sizing_request()
        };
        assert!(validate_sizing_request(&request).is_ok());
    }

    #[test]
    fn test_zero_total_pods() {
        let request = SizingRequest {
            total_pods: 0,
            ..sizing_request()
        };
        let err = validate_sizing_request(&request).unwrap_err();

        assert_eq!(err.field(), "totalPods");
        assert_eq!(err.to_string(), "totalPods must be greater than zero");
    }

    #[test]
    fn test_zero_pod_resources() {
        let request = SizingRequest::new(10, PodFootprint::new(0, 1024), vec![node()]);
        assert_eq!(
            validate_sizing_request(&request).unwrap_err().field(),
            "defaultPod.milliCores"
        );

        let request = SizingRequest::new(10, PodFootprint::new(100, 0), vec![node()]);
        assert_eq!(
            validate_sizing_request(&request).unwrap_err().field(),
            "defaultPod.memory"
        );
    }

    #[test]
    fn test_node_shape_path_is_reported() {
        let mut broken = node();
        broken.cpu.logical = 0;
        let request = SizingRequest {
            node_shapes: vec![node(), broken],
            ..sizing_request()
        };

        assert_eq!(
            validate_sizing_request(&request).unwrap_err().field(),
            "nodeShapes[1].cpu.logical"
        );
    }

    #[test]
    fn test_zero_availability_zones() {
        let request = logging_request().with_availability_zones(0);
        assert_eq!(validate_logging_request(&request).unwrap_err().field(), "azCount");
    }

    #[test]
    fn test_infra_node_needs_disks() {
        let request = LoggingSizingRequest {
            infra_node_shapes: vec![node().with_disk(0, GIB)],
            ..logging_request()
        };
        assert_eq!(
            validate_logging_request(&request).unwrap_err().field(),
            "infraNodeShapes[0].disk"
        );

        let request = LoggingSizingRequest {
            infra_node_shapes: vec![node().with_disk(GIB, 0)],
            ..logging_request()
        };
        assert_eq!(
            validate_logging_request(&request).unwrap_err().field(),
            "infraNodeShapes[0].diskBandwidth"
        );
    }

    #[test]
    fn test_oversized_event_class_is_rejected() {
        let flood = LogEventClass::new(1, 1_000_000)
            .with_event_size(1 << 32)
            .with_events_per_hour(1 << 32);
        let request = LoggingSizingRequest {
            event_classes: vec![LogEventClass::new(10, 100), flood],
            ..logging_request()
        };
        let err = validate_logging_request(&request).unwrap_err();

        assert_eq!(err.field(), "eventClasses[1]");
        assert_eq!(err.to_string(), "eventClasses[1] is too large to size");
    }

    #[test]
    fn test_retention_overflow_is_rejected() {
        // fits as bandwidth, overflows once multiplied by a year of seconds
        let class = LogEventClass::new(1, 1 << 20)
            .with_event_size(1 << 20)
            .with_events_per_hour(1 << 20)
            .with_retention_days(365);
        let request = LoggingSizingRequest {
            event_classes: vec![class],
            ..logging_request()
        };

        assert_eq!(
            validate_logging_request(&request).unwrap_err().field(),
            "eventClasses[0]"
        );
    }

    #[test]
    fn test_combined_event_classes_overflow() {
        // each class alone stays below u64::MAX bytes, together they do not
        let class = LogEventClass::new(1, 1 << 22)
            .with_event_size(1 << 20)
            .with_events_per_hour(3600)
            .with_retention_days(1);
        let request = LoggingSizingRequest {
            event_classes: vec![class; 64],
            ..logging_request()
        }
        .with_replicas(0);

        assert!(validate_logging_request(&LoggingSizingRequest {
            event_classes: request.event_classes[..1].to_vec(),
            ..request.clone()
        })
        .is_ok());
        assert_eq!(
            validate_logging_request(&request).unwrap_err().field(),
            "eventClasses"
        );
    }

    #[test]
    fn test_pod_reservation_overflow_is_rejected() {
        let request = SizingRequest::new(10, PodFootprint::new(100, u64::MAX - 1), vec![node()]);
        let err = validate_sizing_request(&request).unwrap_err();

        assert_eq!(err.field(), "defaultPod.memory");
        assert!(matches!(err, ValidationError::TooLarge { .. }));

        let request = SizingRequest::new(10, PodFootprint::new(u64::MAX, 1024), vec![node()]);
        assert_eq!(
            validate_sizing_request(&request).unwrap_err().field(),
            "defaultPod.milliCores"
        );
    }
}
