//! Service health backed by startup calibration of the sizing engines
//!
//! Before the service takes traffic each ranker sizes a reference workload
//! with a known answer. An engine that disagrees is reported on `/healthz` and
//! keeps `/readyz` failing.

use serde::Serialize;
use sizing_lib::{
    ClusterRanker, CpuSpec, InfraNodeSizer, LogEventClass, LoggingRanker, LoggingSizingRequest,
    NodeShape, NodeSizer, PodFootprint, GIB,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub const CLUSTER_ENGINE: &str = "cluster_ranker";
pub const LOGGING_ENGINE: &str = "logging_ranker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Outcome of one engine's calibration run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Calibration {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<String>,
    pub checked_at: i64,
}

impl Calibration {
    fn from_outcome(outcome: Result<(), String>) -> Self {
        let (status, mismatch) = match outcome {
            Ok(()) => (HealthStatus::Healthy, None),
            Err(mismatch) => (HealthStatus::Unhealthy, Some(mismatch)),
        };

        Self {
            status,
            mismatch,
            checked_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub timestamp: i64,
    pub engines: BTreeMap<&'static str, Calibration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// 250 quiet 100m pods: 145 fit a 16-thread node, so two nodes
pub fn calibrate_cluster<S: NodeSizer>(ranker: &ClusterRanker<S>) -> Result<(), String> {
    let node = NodeShape::new(64 * GIB, CpuSpec::new(1, 8, 16));
    let pod = PodFootprint::new(100, 100_000).with_logging_events_per_second(1);

    let results = ranker.rank(250, &pod, std::slice::from_ref(&node));
    match results.as_slice() {
        [result] if result.pods_per_node() == 145 && result.nodes() == 2 => Ok(()),
        [result] => Err(format!(
            "expected 2 nodes of 145 pods, got {} nodes of {} pods",
            result.nodes(),
            result.pods_per_node()
        )),
        _ => Err(format!("expected one feasible shape, got {}", results.len())),
    }
}

/// 4000 containers at 5 KiB/s kept 28 days on 2 TiB disks in three zones
pub fn calibrate_logging<S: InfraNodeSizer>(ranker: &LoggingRanker<S>) -> Result<(), String> {
    let node = NodeShape::new(64 * GIB, CpuSpec::new(4, 8, 16)).with_disk(2048 * GIB, GIB);
    let request = LoggingSizingRequest::new(
        vec![LogEventClass::new(400, 4000)
            .with_event_size(256)
            .with_events_per_hour(5 * 3600)
            .with_retention_days(28)],
        vec![node],
        30,
    )
    .with_availability_zones(3)
    .with_replicas(1);

    let results = ranker.rank(&request);
    match results.as_slice() {
        [result] if result.logging_pods() == 12 && result.nodes() == 12 => Ok(()),
        [result] => Err(format!(
            "expected 12 logging pods on 12 nodes, got {} pods on {} nodes",
            result.logging_pods(),
            result.nodes()
        )),
        _ => Err(format!("expected one infra shape, got {}", results.len())),
    }
}

#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    engines: Arc<RwLock<BTreeMap<&'static str, Calibration>>>,
    ready: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, engine: &'static str, outcome: Result<(), String>) {
        if let Err(mismatch) = &outcome {
            warn!(engine, mismatch = %mismatch, "Sizing engine failed calibration");
        }

        self.engines
            .write()
            .await
            .insert(engine, Calibration::from_outcome(outcome));
    }

    /// Calibrate both rankers; true when both agree with their reference
    pub async fn calibrate<C, L>(
        &self,
        cluster: &ClusterRanker<C>,
        logging: &LoggingRanker<L>,
    ) -> bool
    where
        C: NodeSizer,
        L: InfraNodeSizer,
    {
        self.record(CLUSTER_ENGINE, calibrate_cluster(cluster)).await;
        self.record(LOGGING_ENGINE, calibrate_logging(logging)).await;

        let healthy = self.health().await.status == HealthStatus::Healthy;
        info!(healthy, "Sizing engines calibrated");
        healthy
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let engines = self.engines.read().await.clone();
        let status = if engines
            .values()
            .all(|c| c.status == HealthStatus::Healthy)
        {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().timestamp(),
            engines,
        }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let reason = if !*self.ready.read().await {
            Some("Service not yet initialized".to_string())
        } else {
            self.engines
                .read()
                .await
                .iter()
                .find(|(_, c)| c.status == HealthStatus::Unhealthy)
                .map(|(engine, _)| format!("{engine} failed calibration"))
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
        }
    }
}
