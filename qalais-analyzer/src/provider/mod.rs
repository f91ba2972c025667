//! Analysis provider abstraction and the remote HTTP implementation

mod remote;

pub use remote::RemoteProvider;

use crate::grid::Position;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cloud function that does the actual image analysis
pub const DEFAULT_ENDPOINT: &str =
    "https://functions.poehali.dev/e40a9d9a-2d3f-4512-a9ea-cc2ec8933873";

/// Errors that can occur when talking to the analysis service
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Body sent to the analysis service
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    /// Link to the bot message or image, exactly as the user typed it
    pub telegram_url: String,
}

impl AnalyzeRequest {
    pub fn new(telegram_url: impl Into<String>) -> Self {
        Self {
            telegram_url: telegram_url.into(),
        }
    }
}

/// Successful response from the analysis service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisResult {
    /// Winning cells
    pub positions: Vec<Position>,

    /// Ready-made summary; derived from positions when missing
    #[serde(default)]
    pub result_text: Option<String>,
}

impl AnalysisResult {
    /// Text for the result card
    pub fn summary(&self) -> String {
        match &self.result_text {
            Some(text) => text.clone(),
            None => crate::grid::summarize(&self.positions),
        }
    }
}

/// Trait for analysis backends
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Where requests go
    fn endpoint(&self) -> &str;

    /// Analyze one message link
    async fn analyze(&self, telegram_url: &str) -> Result<AnalysisResult, ProviderError>;
}
