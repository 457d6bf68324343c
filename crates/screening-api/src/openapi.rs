//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI document.
//! Serves at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the screening API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sanctions Screening API",
        version = "0.3.0",
        description = "Screens natural persons against sanctions watchlists through an external entity-matching engine.\n\nEvery screen queries each configured dataset, merges and ranks the scored candidates, and returns a `clear`, `review` or `block` decision with a risk tier and human-readable reasons. A screen that cannot query every dataset returns an error, never a decision.\n\nSupplying `request_id` makes a screen idempotent: one audit record per id.",
        license(name = "BUSL-1.1")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::screening::screen_person,
        crate::routes::health::service_info,
        crate::routes::health::health,
    ),
    components(
        schemas(
            // ── Error types ─────────────────────────────────────────────
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            // ── Screening DTOs ──────────────────────────────────────────
            crate::routes::screening::ScreenPersonRequest,
            crate::routes::screening::ScreenPersonResponse,
            crate::routes::screening::MatchView,
            crate::routes::screening::MetadataView,
            crate::routes::screening::ThresholdsView,
            crate::routes::screening::InputFieldsView,
            // ── Status DTOs ─────────────────────────────────────────────
            crate::routes::health::ServiceInfo,
            crate::routes::health::HealthResponse,
        ),
    ),
    tags(
        (name = "screening", description = "Sanctions watchlist screening of natural persons"),
        (name = "health", description = "Service status and matching engine readiness"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
