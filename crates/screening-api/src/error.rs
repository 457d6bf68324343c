//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps screening failures to HTTP status codes with a JSON body of the
//! form `{"error": {"code", "message", "details?"}}`.
//!
//! | Variant | Status | Code |
//! |---------|--------|------|
//! | `BadRequest` | 400 | `BAD_REQUEST` |
//! | `ServiceUnavailable` | 503 | `SERVICE_UNAVAILABLE` |
//! | `UpstreamError` | 502 | `UPSTREAM_ERROR` |
//! | `Internal` | 500 | `INTERNAL_ERROR` |
//!
//! Raw upstream response bodies, readiness failure reasons and internal
//! messages are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use screening_core::ValidationError;
use screening_engine::ScreeningError;

/// Client-facing message for every 503.
pub(crate) const NOT_READY_MESSAGE: &str = "matching engine not ready; retry later";

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "BAD_REQUEST", "UPSTREAM_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional context, e.g. the dataset that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed JSON, missing or blank name, unparseable date (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The matching engine is not ready (503). Retryable. The reason is
    /// logged, not returned.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A dataset call failed (502). `reason` is logged, not returned.
    #[error("upstream call failed for dataset {dataset}: {reason}")]
    UpstreamError { dataset: String, reason: String },

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::UpstreamError { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, details) = match &self {
            Self::Internal(_) => ("An internal error occurred".to_string(), None),
            Self::ServiceUnavailable(_) => (NOT_READY_MESSAGE.to_string(), None),
            Self::UpstreamError { dataset, .. } => (
                format!("Watchlist dataset {dataset} could not be screened; no decision was made"),
                Some(serde_json::json!({ "dataset": dataset })),
            ),
            other => (other.to_string(), None),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::UpstreamError { .. } => tracing::error!(error = %self, "upstream matching engine error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            Self::BadRequest(_) => tracing::debug!(error = %self, "rejected request"),
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<ScreeningError> for AppError {
    fn from(err: ScreeningError) -> Self {
        match err {
            ScreeningError::InvalidInput(e) => Self::BadRequest(e.to_string()),
            ScreeningError::UpstreamNotReady { reason } => {
                Self::ServiceUnavailable(format!("matching engine not ready: {reason}"))
            }
            ScreeningError::UpstreamCallFailure { dataset, reason } => {
                Self::UpstreamError { dataset, reason }
            }
        }
    }
}
