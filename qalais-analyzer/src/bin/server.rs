//! Qalais page server binary

use anyhow::{Context, Result};
use qalais::api::{create_router, ApiState};
use qalais::notify::{LogNotifier, MemoryNotifier, Tee};
use qalais::page::AnalyzerPage;
use qalais::AnalyzerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Qalais page server v{}", env!("CARGO_PKG_VERSION"));

    // Config file is optional; defaults point at the hosted service
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let config = AnalyzerConfig::from_file(&path)
                .with_context(|| format!("Failed to load config file: {}", path))?;
            info!(config_path = path, "Loaded configuration");
            config
        }
        None => {
            warn!("No config file given, using defaults");
            AnalyzerConfig::default()
        }
    };

    let provider = config
        .provider()
        .context("Failed to create analysis client")?;
    info!(
        endpoint = config.endpoint,
        timeout_secs = ?config.timeout_secs,
        "Using analysis service"
    );

    let notifications = Arc::new(MemoryNotifier::new(config.history_limit));
    let page = Arc::new(AnalyzerPage::new(
        Arc::new(provider),
        Arc::new(Tee(LogNotifier, Arc::clone(&notifications))),
    ));

    let state = Arc::new(ApiState {
        page,
        notifications,
    });

    let app = create_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr))?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
