//! # screening-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the screening service. Configuration
//! comes from flags, `SCREENING_*` environment variables and an optional
//! `.env` file.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use screening_api::config::{AppConfig, LogFormat};
use screening_api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::parse();

    // Initialize structured tracing.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::from_config(config).context("invalid configuration")?;

    tracing::info!(
        upstream = %state.config.upstream_url,
        datasets = %state.config.datasets,
        audit_log = %state.config.audit_log.display(),
        "screening service configured"
    );

    let app = screening_api::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    tracing::info!("screening API listening on {}", addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
