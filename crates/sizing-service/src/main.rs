//! okdcalc-service - OKD cluster sizing calculator
//!
//! Serves compute and logging sizing requests over HTTP, together with
//! health, readiness and Prometheus metrics endpoints.

use anyhow::Result;
use sizing_lib::{PlatformVersion, SizingLogger, SizingMetrics};
use sizing_service::{
    api,
    config::ServiceConfig,
    health::HealthRegistry,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting okdcalc-service");

    let config = ServiceConfig::load()?;
    info!(
        instance = %config.instance_name,
        addr = %config.listen_address(),
        "Service configured"
    );

    let health_registry = HealthRegistry::new();

    let metrics = SizingMetrics::new();
    let logger = SizingLogger::new(&config.instance_name);
    logger.log_startup(SERVICE_VERSION, &PlatformVersion::default().to_string());

    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics,
        logger.clone(),
    ));

    if !health_registry
        .calibrate(&app_state.cluster_ranker, &app_state.logging_ranker)
        .await
    {
        error!("Sizing engines failed calibration, service stays unready");
    }
    health_registry.set_ready(true).await;

    let mut api_handle = tokio::spawn(api::serve(config.listen_address(), app_state));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            logger.log_shutdown("SIGINT received");
        }
        result = &mut api_handle => {
            match result {
                Ok(Ok(())) => logger.log_shutdown("API server stopped"),
                Ok(Err(e)) => {
                    error!(error = %e, "API server failed");
                    return Err(e);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    info!("Shutting down");
    Ok(())
}
