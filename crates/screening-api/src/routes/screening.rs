//! # Person Screening API
//!
//! - `POST /v1/sanctions/screen/person`: screen one natural person against
//!   every configured watchlist dataset and return a `clear`, `review` or
//!   `block` decision.
//!
//! Supplying `request_id` makes the call safe to retry: the same id with
//! unchanged upstream data returns the same result and leaves a single
//! audit record.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use screening_core::{
    MatchCandidate, PersonQuery, RequestId, ScreeningMetadata, ScreeningResult, ValidationError,
};
use screening_engine::ScreeningError;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

// ── Request ─────────────────────────────────────────────────────────────

/// Identifying attributes of the person to screen.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ScreenPersonRequest {
    /// Full name as it appears on identity documents. Required.
    #[serde(default)]
    #[schema(example = "Jane Smith")]
    pub full_name: String,
    /// ISO 3166-1 alpha-2 country code.
    #[schema(example = "us")]
    pub country: Option<String>,
    /// Date of birth, `YYYY-MM-DD`.
    #[schema(example = "1980-01-31")]
    pub date_of_birth: Option<String>,
    pub passport_number: Option<String>,
    pub national_id: Option<String>,
    /// Caller-chosen id making retries idempotent. Generated when absent.
    pub request_id: Option<String>,
    /// Caller's user reference, recorded in the audit trail only.
    pub user_id: Option<String>,
    /// Business context such as `withdrawal` or `registration`, recorded in
    /// the audit trail only.
    pub transaction_context: Option<String>,
}

impl ScreenPersonRequest {
    /// Validate into a domain query.
    pub fn into_query(self) -> Result<PersonQuery, ValidationError> {
        let mut builder = PersonQuery::builder(self.full_name);
        if let Some(country) = self.country {
            builder = builder.country(country);
        }
        if let Some(raw) = self.date_of_birth.filter(|d| !d.trim().is_empty()) {
            builder = builder.date_of_birth(PersonQuery::parse_date_of_birth(&raw)?);
        }
        if let Some(passport) = self.passport_number {
            builder = builder.passport_number(passport);
        }
        if let Some(national_id) = self.national_id {
            builder = builder.national_id(national_id);
        }
        if let Some(raw) = self.request_id {
            builder = builder.request_id(RequestId::new(raw)?);
        }
        if let Some(user_id) = self.user_id {
            builder = builder.user_id(user_id);
        }
        if let Some(context) = self.transaction_context {
            builder = builder.transaction_context(context);
        }
        builder.build()
    }
}

// ── Response ────────────────────────────────────────────────────────────

/// Screening decision with supporting evidence.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScreenPersonResponse {
    pub request_id: String,
    /// `clear`, `review` or `block`.
    #[schema(example = "review")]
    pub decision: String,
    /// `none`, `low`, `medium`, `high` or `critical`.
    #[schema(example = "medium")]
    pub risk_level: String,
    /// Highest score over every candidate considered, 0.0 when none.
    pub top_score: f64,
    /// Highest-ranked candidates, score descending.
    pub matches: Vec<MatchView>,
    /// Human-readable reasoning, in a fixed order.
    pub reasons: Vec<String>,
    pub datasets_checked: Vec<String>,
    pub metadata: MetadataView,
}

/// One candidate entity returned by the matching engine.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchView {
    pub dataset: String,
    pub entity_id: String,
    pub caption: String,
    pub score: f64,
    /// The matching engine's own verdict.
    pub is_match: bool,
    pub properties: BTreeMap<String, Vec<String>>,
    pub source_urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetadataView {
    pub total_candidates: usize,
    pub matches_returned: usize,
    pub thresholds: ThresholdsView,
    pub input_fields_provided: InputFieldsView,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThresholdsView {
    pub info: f64,
    pub review: f64,
    pub block: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InputFieldsView {
    pub name: bool,
    pub country: bool,
    pub date_of_birth: bool,
    pub passport_number: bool,
    pub national_id: bool,
}

impl From<MatchCandidate> for MatchView {
    fn from(c: MatchCandidate) -> Self {
        Self {
            dataset: c.dataset.to_string(),
            entity_id: c.entity_id,
            caption: c.caption,
            score: c.score,
            is_match: c.is_match,
            properties: c.properties,
            source_urls: c.source_urls,
        }
    }
}

impl From<ScreeningMetadata> for MetadataView {
    fn from(m: ScreeningMetadata) -> Self {
        let fields = m.input_fields_provided;
        Self {
            total_candidates: m.total_candidates,
            matches_returned: m.matches_returned,
            thresholds: ThresholdsView {
                info: m.thresholds.info(),
                review: m.thresholds.review(),
                block: m.thresholds.block(),
            },
            input_fields_provided: InputFieldsView {
                name: fields.name,
                country: fields.country,
                date_of_birth: fields.date_of_birth,
                passport_number: fields.passport_number,
                national_id: fields.national_id,
            },
        }
    }
}

impl From<ScreeningResult> for ScreenPersonResponse {
    fn from(r: ScreeningResult) -> Self {
        Self {
            request_id: r.request_id.to_string(),
            decision: r.decision.to_string(),
            risk_level: r.risk_level.to_string(),
            top_score: r.top_score,
            matches: r.matches.into_iter().map(MatchView::from).collect(),
            reasons: r.reasons,
            datasets_checked: r.datasets_checked.iter().map(ToString::to_string).collect(),
            metadata: r.metadata.into(),
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/sanctions/screen/person", post(screen_person))
}

/// POST /v1/sanctions/screen/person: Screen a person against sanctions lists.
#[utoipa::path(
    post,
    path = "/v1/sanctions/screen/person",
    request_body = ScreenPersonRequest,
    responses(
        (status = 200, description = "Screening decision", body = ScreenPersonResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 502, description = "A watchlist dataset could not be queried", body = crate::error::ErrorBody),
        (status = 503, description = "Matching engine not ready", body = crate::error::ErrorBody),
    ),
    tag = "screening"
)]
pub(crate) async fn screen_person(
    State(state): State<AppState>,
    body: Result<Json<ScreenPersonRequest>, JsonRejection>,
) -> Result<Json<ScreenPersonResponse>, AppError> {
    let query = match extract_json(body).and_then(|req| req.into_query().map_err(AppError::from)) {
        Ok(query) => query,
        Err(e) => {
            state.metrics.record_failure("invalid_input");
            return Err(e);
        }
    };

    match state.screener.screen_person(query).await {
        Ok(outcome) => {
            let result = outcome.result;
            state
                .metrics
                .record_decision(result.decision.as_str(), result.risk_level.as_str());
            if outcome.audit.is_failed() {
                state.metrics.record_audit_failure();
            }
            Ok(Json(result.into()))
        }
        Err(e) => {
            state.metrics.record_failure(match &e {
                ScreeningError::InvalidInput(_) => "invalid_input",
                ScreeningError::UpstreamNotReady { .. } => "upstream_not_ready",
                ScreeningError::UpstreamCallFailure { .. } => "upstream_failure",
            });
            Err(e.into())
        }
    }
}
