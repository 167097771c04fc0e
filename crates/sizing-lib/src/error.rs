//! Error types for sizing calculations and request validation

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SizingError>;

/// A node shape cannot satisfy the workload
///
/// This is an expected per-candidate outcome. Rankers drop the candidate and
/// never hand the error to their caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    #[error("Not enough CPU per node for this work load: pod needs {required}m, node offers {available}m")]
    InsufficientCpu { required: u64, available: u64 },

    #[error("Not enough memory per node for this work load: pod needs {required} bytes, node offers {available} bytes")]
    InsufficientMemory { required: u64, available: u64 },

    #[error("Too many nodes in cluster: {nodes} exceeds the limit of {limit}")]
    ClusterTooLarge { nodes: u64, limit: u64 },
}

impl SizingError {
    /// Short machine-readable reason, used as a metrics label
    pub fn reason(&self) -> &'static str {
        match self {
            SizingError::InsufficientCpu { .. } => "insufficient_cpu",
            SizingError::InsufficientMemory { .. } => "insufficient_memory",
            SizingError::ClusterTooLarge { .. } => "cluster_too_large",
        }
    }
}

/// A request rejected at the system boundary before it reaches a calculator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: String },

    #[error("{field} is too large to size")]
    TooLarge { field: String },
}

impl ValidationError {
    pub(crate) fn not_positive(field: impl Into<String>) -> Self {
        ValidationError::NotPositive {
            field: field.into(),
        }
    }

    pub(crate) fn too_large(field: impl Into<String>) -> Self {
        ValidationError::TooLarge {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            ValidationError::NotPositive { field } | ValidationError::TooLarge { field } => field,
        }
    }
}
