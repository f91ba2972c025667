//! HTTP provider for the hosted analysis function

use super::{AnalysisProvider, AnalysisResult, AnalyzeRequest, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

/// Provider that POSTs links to the remote analysis endpoint
pub struct RemoteProvider {
    client: Client,
    endpoint: String,
    name: String,
}

impl RemoteProvider {
    /// Create a provider without a request timeout
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_timeout(endpoint, None)
    }

    /// Create a provider, optionally bounding each request
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            name: "remote".to_string(),
        })
    }

    /// Create with a custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl AnalysisProvider for RemoteProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn analyze(&self, telegram_url: &str) -> Result<AnalysisResult, ProviderError> {
        let start = Instant::now();

        // .json() sets Content-Type: application/json
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest::new(telegram_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        // Read as text first so malformed bodies surface as Json errors
        let body = response.text().await?;
        let result: AnalysisResult = serde_json::from_str(&body)?;

        debug!(
            provider = %self.name,
            positions = result.positions.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis response received"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;
    use mockito::{Matcher, Server};
    use serde_json::json;

    async fn setup() -> (mockito::ServerGuard, RemoteProvider) {
        let server = Server::new_async().await;
        let url = format!("{}/analyze", server.url());
        let provider = RemoteProvider::new(url).unwrap();
        (server, provider)
    }

    #[test]
    fn test_provider_creation() {
        let provider = RemoteProvider::new(super::super::DEFAULT_ENDPOINT)
            .unwrap()
            .with_name("poehali");
        assert_eq!(provider.name(), "poehali");
        assert!(provider.endpoint().starts_with("https://functions.poehali.dev/"));
    }

    #[tokio::test]
    async fn test_posts_exact_url() {
        let (mut server, provider) = setup().await;
        let m = server
            .mock("POST", "/analyze")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"telegram_url": " https://t.me/game/42"})))
            .with_status(200)
            .with_body(r#"{"positions":[{"row":1,"col":2}]}"#)
            .expect(1)
            .create_async()
            .await;

        let result = provider.analyze(" https://t.me/game/42").await.unwrap();
        assert_eq!(result.positions, vec![Position::new(1, 2)]);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error() {
        let (mut server, provider) = setup().await;
        let _m = server
            .mock("POST", "/analyze")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        match provider.analyze("https://t.me/game/1").await {
            Err(ProviderError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (mut server, provider) = setup().await;
        let _m = server
            .mock("POST", "/analyze")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = provider.analyze("https://t.me/game/1").await.unwrap_err();
        assert!(matches!(err, ProviderError::Json(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Nothing listens on port 1
        let provider = RemoteProvider::with_timeout(
            "http://127.0.0.1:1/analyze",
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        let err = provider.analyze("https://t.me/game/1").await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
    }
}
