//! # Service Status API
//!
//! - `GET /`: service name, version and endpoint index.
//! - `GET /health`: service status including matching engine readiness.
//!   Always 200; a not-ready engine is reported as `degraded`.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use screening_client::Readiness;

use crate::state::AppState;

const SERVICE_NAME: &str = "Sanctions Screening API";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    /// Endpoint name to method and path.
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `degraded`.
    #[schema(example = "healthy")]
    pub status: String,
    /// Matching engine readiness as observed by this probe.
    pub upstream_status: String,
    /// Datasets every screen is run against.
    pub datasets_available: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
}

/// GET /: Service name, version and endpoint index.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service information", body = ServiceInfo)),
    tag = "health"
)]
pub(crate) async fn service_info() -> Json<ServiceInfo> {
    let endpoints = [
        ("health", "GET /health"),
        ("liveness", "GET /health/liveness"),
        ("readiness", "GET /health/readiness"),
        ("metrics", "GET /metrics"),
        ("openapi", "GET /openapi.json"),
        ("screen_person", "POST /v1/sanctions/screen/person"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        endpoints,
    })
}

/// GET /health: Service and matching engine status.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service status", body = HealthResponse)),
    tag = "health"
)]
pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, upstream_status) = match state.screener.readiness().await {
        Readiness::Ready => ("healthy", "ready".to_string()),
        Readiness::NotReady { reason } => {
            tracing::warn!(%reason, "health check: matching engine not ready");
            ("degraded", "not ready".to_string())
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        upstream_status,
        datasets_available: state
            .screener
            .config()
            .datasets
            .iter()
            .map(ToString::to_string)
            .collect(),
        timestamp: Utc::now(),
    })
}
