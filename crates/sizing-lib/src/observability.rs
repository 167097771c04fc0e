//! Observability for sizing calculations
//!
//! Provides:
//! - Prometheus metrics (sizings served, calculation latency, rejected candidates, shard warnings)
//! - Structured JSON logging with tracing

use crate::cluster::CandidateEvaluation;
use crate::models::LoggingSizingResult;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for calculation latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

pub const KIND_CLUSTER: &str = "cluster";
pub const KIND_LOGGING: &str = "logging";

static GLOBAL_METRICS: OnceLock<SizingMetricsInner> = OnceLock::new();

struct SizingMetricsInner {
    sizings: IntCounterVec,
    sizing_latency_seconds: HistogramVec,
    candidates: IntCounterVec,
    rejected_candidates: IntCounterVec,
    invalid_requests: IntCounterVec,
    shard_limit_warnings: IntCounter,
}

impl SizingMetricsInner {
    fn new() -> Self {
        Self {
            sizings: register_int_counter_vec!(
                "okd_sizing_requests_total",
                "Total number of sizing requests served",
                &["kind"]
            )
            .expect("Failed to register sizing_requests_total"),

            sizing_latency_seconds: register_histogram_vec!(
                "okd_sizing_latency_seconds",
                "Time spent scoring all candidate node shapes of a request",
                &["kind"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register sizing_latency_seconds"),

            candidates: register_int_counter_vec!(
                "okd_sizing_candidates_total",
                "Total number of candidate node shapes evaluated",
                &["kind"]
            )
            .expect("Failed to register sizing_candidates_total"),

            rejected_candidates: register_int_counter_vec!(
                "okd_sizing_rejected_candidates_total",
                "Total number of node shapes dropped as infeasible",
                &["reason"]
            )
            .expect("Failed to register sizing_rejected_candidates_total"),

            invalid_requests: register_int_counter_vec!(
                "okd_sizing_invalid_requests_total",
                "Total number of requests rejected by validation",
                &["kind"]
            )
            .expect("Failed to register sizing_invalid_requests_total"),

            shard_limit_warnings: register_int_counter!(
                "okd_sizing_shard_limit_warnings_total",
                "Total number of logging sizings above the active primary shard ceiling"
            )
            .expect("Failed to register sizing_shard_limit_warnings_total"),
        }
    }
}

/// Sizing metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct SizingMetrics {
    _private: (),
}

impl Default for SizingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SizingMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SizingMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SizingMetricsInner {
        GLOBAL_METRICS.get_or_init(SizingMetricsInner::new)
    }

    /// Record one served compute sizing and its dropped candidates
    pub fn record_cluster_sizing(&self, evaluation: &CandidateEvaluation, duration_secs: f64) {
        let inner = self.inner();
        inner.sizings.with_label_values(&[KIND_CLUSTER]).inc();
        inner
            .sizing_latency_seconds
            .with_label_values(&[KIND_CLUSTER])
            .observe(duration_secs);
        inner
            .candidates
            .with_label_values(&[KIND_CLUSTER])
            .inc_by((evaluation.results.len() + evaluation.rejected.len()) as u64);

        for rejection in &evaluation.rejected {
            inner
                .rejected_candidates
                .with_label_values(&[rejection.error.reason()])
                .inc();
        }
    }

    /// Record one served logging sizing
    pub fn record_logging_sizing(&self, results: &[LoggingSizingResult], duration_secs: f64) {
        let inner = self.inner();
        inner.sizings.with_label_values(&[KIND_LOGGING]).inc();
        inner
            .sizing_latency_seconds
            .with_label_values(&[KIND_LOGGING])
            .observe(duration_secs);
        inner
            .candidates
            .with_label_values(&[KIND_LOGGING])
            .inc_by(results.len() as u64);

        if results.iter().any(LoggingSizingResult::shard_limit_exceeded) {
            inner.shard_limit_warnings.inc();
        }
    }

    pub fn inc_invalid_requests(&self, kind: &str) {
        self.inner().invalid_requests.with_label_values(&[kind]).inc();
    }
}

/// Structured logger for sizing events
///
/// Provides consistent JSON-formatted logging for served sizings and
/// service lifecycle.
#[derive(Clone)]
pub struct SizingLogger {
    instance: String,
}

impl SizingLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log a served compute sizing
    pub fn log_cluster_sizing(&self, total_pods: u32, evaluation: &CandidateEvaluation) {
        let best = evaluation.results.iter().min_by_key(|r| r.score());

        info!(
            event = "cluster_sized",
            instance = %self.instance,
            total_pods = total_pods,
            feasible = evaluation.results.len(),
            rejected = evaluation.rejected.len(),
            best_score = ?best.map(|r| r.score()),
            best_nodes = ?best.map(|r| r.nodes()),
            "Sized compute cluster"
        );
    }

    /// Log a served logging sizing
    pub fn log_logging_sizing(&self, results: &[LoggingSizingResult]) {
        let best = results.iter().min_by_key(|r| r.score());

        info!(
            event = "logging_sized",
            instance = %self.instance,
            candidates = results.len(),
            best_score = ?best.map(|r| r.score()),
            best_logging_pods = ?best.map(|r| r.logging_pods()),
            "Sized logging cluster"
        );

        if let Some(result) = results.iter().find(|r| r.shard_limit_exceeded()) {
            warn!(
                event = "shard_limit_exceeded",
                instance = %self.instance,
                active_primary_shards = result.active_primary_shards(),
                limit = crate::logging::MAX_ACTIVE_PRIMARY_SHARDS,
                "Logging workload exceeds the active primary shard ceiling"
            );
        }
    }

    /// Log a request rejected by validation
    pub fn log_invalid_request(&self, kind: &str, details: &str) {
        warn!(
            event = "invalid_request",
            instance = %self.instance,
            kind = %kind,
            details = %details,
            "Rejected sizing request"
        );
    }

    pub fn log_startup(&self, version: &str, platform_version: &str) {
        info!(
            event = "service_started",
            instance = %self.instance,
            service_version = %version,
            platform_version = %platform_version,
            "Sizing service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Sizing service shutting down"
        );
    }
}
