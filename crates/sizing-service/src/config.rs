//! Service configuration

use anyhow::Result;
use serde::Deserialize;
use tracing::warn;

/// Service configuration, read from `OKDCALC_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Instance name used in structured logs
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Port for the sizing, health and metrics endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "okdcalc".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            bind_address: default_bind_address(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("OKDCALC"))
            .build()?;

        Ok(Self::from_config(config))
    }

    /// Deserialize `config`, falling back to defaults when any value is invalid
    pub fn from_config(config: config::Config) -> Self {
        config.try_deserialize().unwrap_or_else(|e| {
            warn!(error = %e, "Invalid OKDCALC_* configuration, using defaults");
            Self::default()
        })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.api_port)
    }
}
