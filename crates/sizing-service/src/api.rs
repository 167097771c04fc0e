//! HTTP API for sizing requests, health checks and Prometheus metrics

use crate::health::{HealthRegistry, HealthStatus};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use sizing_lib::{
    observability::{KIND_CLUSTER, KIND_LOGGING},
    validate_logging_request, validate_sizing_request, ClusterRanker, LoggingRanker,
    LoggingSizingRequest, LoggingSizingResult, SizingLogger, SizingMetrics, SizingRequest,
    SizingResult,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: SizingMetrics,
    pub logger: SizingLogger,
    pub cluster_ranker: ClusterRanker,
    pub logging_ranker: LoggingRanker,
}

impl AppState {
    pub fn new(health_registry: HealthRegistry, metrics: SizingMetrics, logger: SizingLogger) -> Self {
        Self {
            health_registry,
            metrics,
            logger,
            cluster_ranker: ClusterRanker::new(),
            logging_ranker: LoggingRanker::new(),
        }
    }
}

/// Body of every 4xx response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

/// A request the service refuses to size
#[derive(Debug)]
pub enum ApiError {
    MalformedBody(String),
    Invalid(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (error, details) = match self {
            ApiError::MalformedBody(details) => ("malformed_request", details),
            ApiError::Invalid(details) => ("invalid_request", details),
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl AppState {
    fn reject(&self, kind: &str, error: ApiError) -> ApiError {
        let details = match &error {
            ApiError::MalformedBody(details) | ApiError::Invalid(details) => details,
        };
        self.metrics.inc_invalid_requests(kind);
        self.logger.log_invalid_request(kind, details);
        error
    }
}

/// Rank candidate node shapes for a compute workload
async fn size_cluster(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SizingRequest>, JsonRejection>,
) -> Result<Json<Vec<SizingResult>>, ApiError> {
    let Json(request) =
        body.map_err(|e| state.reject(KIND_CLUSTER, ApiError::MalformedBody(e.body_text())))?;
    validate_sizing_request(&request)
        .map_err(|e| state.reject(KIND_CLUSTER, ApiError::Invalid(e.to_string())))?;

    let start = Instant::now();
    let evaluation = state.cluster_ranker.evaluate(
        request.total_pods,
        &request.default_pod,
        &request.node_shapes,
    );
    state
        .metrics
        .record_cluster_sizing(&evaluation, start.elapsed().as_secs_f64());
    state.logger.log_cluster_sizing(request.total_pods, &evaluation);

    Ok(Json(evaluation.results))
}

/// Rank candidate infra node shapes for a logging workload
async fn size_logging(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoggingSizingRequest>, JsonRejection>,
) -> Result<Json<Vec<LoggingSizingResult>>, ApiError> {
    let Json(request) =
        body.map_err(|e| state.reject(KIND_LOGGING, ApiError::MalformedBody(e.body_text())))?;
    validate_logging_request(&request)
        .map_err(|e| state.reject(KIND_LOGGING, ApiError::Invalid(e.to_string())))?;

    let start = Instant::now();
    let results = state.logging_ranker.rank(&request);
    state
        .metrics
        .record_logging_sizing(&results, start.elapsed().as_secs_f64());
    state.logger.log_logging_sizing(&results);

    Ok(Json(results))
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/cluster", post(size_cluster))
        .route("/logging", post(size_logging))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(addr: String, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
