//! Sizing subcommands

pub mod cluster;
pub mod logging;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use sizing_lib::{ClusterRanker, LoggingRanker};
use std::io::Read;
use std::path::Path;

use crate::client::ApiClient;

/// Where sizing requests are answered
pub enum Backend {
    Remote(ApiClient),
    Local {
        cluster: ClusterRanker,
        logging: LoggingRanker,
    },
}

impl Backend {
    pub fn local() -> Self {
        Backend::Local {
            cluster: ClusterRanker::new(),
            logging: LoggingRanker::new(),
        }
    }
}

/// Read a JSON request from a file, or from stdin when `source` is `-`
pub fn read_request<T: DeserializeOwned>(source: &str) -> Result<T> {
    let content = if source == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read request from stdin")?;
        content
    } else {
        std::fs::read_to_string(Path::new(source))
            .with_context(|| format!("Failed to read request file {}", source))?
    };

    serde_json::from_str(&content).context("Failed to parse request")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sizing_lib::{SizingRequest, DEFAULT_POD_LOGGING_EVENTS_PER_SECOND};
    use std::io::Write;

    #[test]
    fn test_read_request_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "totalPods": 100,
                "defaultPod": {{"milliCores": 100, "memory": 1024}},
                "nodeShapes": []
            }}"#
        )
        .unwrap();

        let request: SizingRequest = read_request(file.path().to_str().unwrap()).unwrap();
        assert_eq!(request.total_pods, 100);
        assert_eq!(
            request.default_pod.logging_events_per_second,
            DEFAULT_POD_LOGGING_EVENTS_PER_SECOND
        );
    }

    #[test]
    fn test_read_request_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = read_request::<SizingRequest>(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to read request file"));
    }

    #[test]
    fn test_read_request_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"totalPods": "lots"}}"#).unwrap();

        assert!(read_request::<SizingRequest>(file.path().to_str().unwrap()).is_err());
    }
}
