//! Logging-cluster sizing
//!
//! This module provides:
//! - Aggregated bandwidth, stored bytes and shard count of log event classes
//! - Logging-cluster topology (disks, pods, nodes) per infra node shape
//! - Ranking of candidate infra node shapes by score

mod ranker;
mod sizer;
mod volume;

pub use ranker::LoggingRanker;
pub use sizer::{
    LoggingNodeSizer, BYTES_PER_LOGGING_POD, RESERVED_MEMORY_PER_LOGGING_NODE,
    RESERVED_MILLICORES_PER_LOGGING_NODE,
};
pub use volume::{
    LoggingVolume, LoggingVolumeModel, MAX_ACTIVE_PRIMARY_SHARDS, SECONDS_PER_DAY,
    SECONDS_PER_HOUR,
};

use crate::models::{LoggingSizingRequest, LoggingSizingResult, NodeShape};

/// Trait for sizing a logging cluster on one infra node shape
pub trait InfraNodeSizer: Send + Sync {
    fn size(&self, infra_node: &NodeShape, request: &LoggingSizingRequest) -> LoggingSizingResult;
}
