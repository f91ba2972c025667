//! Qalais Analyzer - client for the Telegram game grid analysis service
//!
//! This crate provides:
//! - The analyzer page: validation, the analyze action, and its state
//! - A provider for the hosted analysis function
//! - Terminal rendering of the 5x3 grid and result summary
//! - A small HTTP server that serves the page in a browser

pub mod api;
pub mod grid;
pub mod notify;
pub mod page;
pub mod provider;
pub mod render;

pub use grid::{Grid, Position};
pub use page::{AnalysisOutcome, AnalyzerPage, PageState};
pub use provider::{AnalysisProvider, AnalysisResult, ProviderError, RemoteProvider};

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for the analyzer
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AnalyzerConfig {
    /// Analysis service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout; no timeout when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Address the page server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Notifications the server keeps for /api/state
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_endpoint() -> String { provider::DEFAULT_ENDPOINT.to_string() }
fn default_listen_addr() -> String { "0.0.0.0:8080".to_string() }
fn default_history_limit() -> usize { 16 }

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: None,
            listen_addr: default_listen_addr(),
            history_limit: default_history_limit(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Build the remote provider this config points at
    pub fn provider(&self) -> Result<RemoteProvider, ProviderError> {
        RemoteProvider::with_timeout(&self.endpoint, self.timeout())
    }
}
