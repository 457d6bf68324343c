//! # Application State
//!
//! Shared state for the Axum application: the screening service, metrics,
//! and the configuration it was built from. Cheap to clone; everything
//! inside is reference-counted.

use std::sync::Arc;

use screening_client::HttpMatchingEngine;
use screening_engine::{AuditSink, JsonlAuditLog, Screener};

use crate::config::{AppConfig, ConfigError};
use crate::middleware::metrics::ScreeningMetrics;

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub screener: Screener<HttpMatchingEngine>,
    pub metrics: ScreeningMetrics,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build the full service from validated configuration.
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let sink = Arc::new(JsonlAuditLog::open(&config.audit_log)?);
        Self::with_sink(config, sink)
    }

    /// Build the service around a caller-supplied audit sink.
    pub fn with_sink(config: AppConfig, sink: Arc<dyn AuditSink>) -> Result<Self, ConfigError> {
        let screening = config.screening_config()?;
        let engine = HttpMatchingEngine::new(&config.engine_config()?)?;
        Ok(Self {
            screener: Screener::new(Arc::new(engine), screening, sink),
            metrics: ScreeningMetrics::new()?,
            config: Arc::new(config),
        })
    }
}
