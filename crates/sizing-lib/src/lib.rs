//! Sizing library for OKD clusters
//!
//! This crate provides the core functionality for:
//! - Pod density and node count per candidate node shape
//! - Ranking of node shapes for a compute workload
//! - Logging-cluster topology and ranking of infra node shapes
//! - Request validation at the service boundary
//! - Metrics and structured logging

pub mod cluster;
pub mod error;
pub mod logging;
pub mod models;
pub mod observability;
pub mod validation;

pub use cluster::{CandidateEvaluation, ClusterRanker, ClusterSizer, NodeSizer, Rejection};
pub use error::{Result, SizingError, ValidationError};
pub use logging::{InfraNodeSizer, LoggingNodeSizer, LoggingRanker};
pub use models::*;
pub use observability::{SizingLogger, SizingMetrics};
pub use validation::{validate_logging_request, validate_sizing_request};
