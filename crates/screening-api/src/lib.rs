//! # screening-api: Axum HTTP Service for Watchlist Screening
//!
//! Exposes the screening pipeline of [`screening_engine`] over HTTP.
//!
//! ## API Surface
//!
//! | Path                            | Module                  | Purpose                 |
//! |---------------------------------|-------------------------|-------------------------|
//! | `POST /v1/sanctions/screen/person` | [`routes::screening`] | Screen one person       |
//! | `GET /`                         | [`routes::health`]      | Service index           |
//! | `GET /health`                   | [`routes::health`]      | Status incl. upstream   |
//! | `GET /health/liveness`          | this module             | Liveness probe          |
//! | `GET /health/readiness`         | this module             | Readiness probe         |
//! | `GET /metrics`                  | this module             | Prometheus scrape       |
//! | `GET /openapi.json`             | [`openapi`]             | OpenAPI document        |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers; screening lives in
//!   `screening-engine`.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ScreeningMetrics;

pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Probes and `/metrics` are mounted outside the metrics middleware.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let api = Router::new()
        .merge(routes::screening::router())
        .merge(routes::health::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(Extension(metrics.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .route("/metrics", axum::routing::get(prometheus_metrics))
        .layer(Extension(metrics))
        .with_state(state);

    Router::new().merge(probes).merge(api)
}

/// GET /metrics: Prometheus metrics scrape endpoint.
async fn prometheus_metrics(Extension(metrics): Extension<ScreeningMetrics>) -> impl IntoResponse {
    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => AppError::Internal(e).into_response(),
    }
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 "ready" when the matching engine reports ready,
/// 503 otherwise.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.screener.readiness().await {
        screening_client::Readiness::Ready => (StatusCode::OK, "ready").into_response(),
        screening_client::Readiness::NotReady { reason } => {
            tracing::warn!(%reason, "readiness probe: matching engine not ready");
            (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
        }
    }
}
