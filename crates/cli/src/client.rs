//! API client for communicating with the sizing service

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sizing_lib::{LoggingSizingRequest, LoggingSizingResult, SizingRequest, SizingResult};
use url::Url;

/// API client for the sizing service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        tracing::debug!(url = %url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.details)
                .unwrap_or(body);
            anyhow::bail!("API error ({}): {}", status, message);
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn size_cluster(&self, request: &SizingRequest) -> Result<Vec<SizingResult>> {
        self.post("cluster", request).await
    }

    pub async fn size_logging(&self, request: &LoggingSizingRequest) -> Result<Vec<LoggingSizingResult>> {
        self.post("logging", request).await
    }
}

/// Error body of a rejected request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sizing_lib::{CpuSpec, NodeShape, PodFootprint, GIB};

    fn request() -> SizingRequest {
        SizingRequest::new(
            250,
            PodFootprint::new(100, 100_000),
            vec![NodeShape::new(64 * GIB, CpuSpec::new(1, 8, 16))],
        )
    }

    #[tokio::test]
    async fn test_size_cluster_posts_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/cluster")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"totalPods": 250}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{
                    "nodeShape": {"memory": 68719476736, "cpu": {"cores": 8, "logical": 16}},
                    "defaultPod": {"milliCores": 100, "memory": 100000},
                    "podsPerNode": 145,
                    "nodes": 2,
                    "score": 1
                }]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let results = client.size_cluster(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].pods_per_node(), 145);
        // derived values are recomputed, never read back
        assert_eq!(results[0].score(), 2000);
    }

    #[tokio::test]
    async fn test_rejected_request_reports_details() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/cluster")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "invalid_request", "details": "totalPods must be greater than zero"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.size_cluster(&request()).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("totalPods must be greater than zero"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
