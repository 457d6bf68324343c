//! # Audit Record
//!
//! Immutable snapshot of one screening request: what was asked, every
//! candidate the engine returned (not only the top-K shown to the caller),
//! and what was decided.
//!
//! The `outcome_digest` covers everything except `recorded_at` and
//! `rescreen_of`, so a retried screen that reaches the same answer produces
//! the same digest and can be recognised as a duplicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::candidate::{DatasetScope, MatchCandidate};
use crate::decision::{RiskLevel, ScreeningDecision};
use crate::digest::{CanonicalBytes, OutcomeDigest};
use crate::error::ValidationError;
use crate::person::{PersonQuery, RequestId};
use crate::result::ScreeningResult;

/// Append-only audit entry, one per request id (plus one per deliberate
/// re-screen whose answer changed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub request_id: RequestId,
    pub recorded_at: DateTime<Utc>,
    pub input: PersonQuery,
    pub datasets_checked: Vec<DatasetScope>,
    /// Every candidate considered, ranked.
    pub candidates: Vec<MatchCandidate>,
    pub decision: ScreeningDecision,
    pub risk_level: RiskLevel,
    pub top_score: f64,
    pub reasons: Vec<String>,
    pub outcome_digest: OutcomeDigest,
    /// Digest of the earlier record for this request id when this entry
    /// records a changed answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescreen_of: Option<OutcomeDigest>,
}

/// The digest-covered portion of a record.
#[derive(Serialize)]
struct OutcomeContent<'a> {
    request_id: &'a RequestId,
    input: &'a PersonQuery,
    datasets_checked: &'a [DatasetScope],
    candidates: &'a [MatchCandidate],
    decision: ScreeningDecision,
    risk_level: RiskLevel,
    top_score: f64,
    reasons: &'a [String],
}

impl AuditRecord {
    /// Snapshot a completed screen.
    ///
    /// `candidates` is the full ranked candidate list; `result` supplies the
    /// decision fields.
    pub fn new(
        input: &PersonQuery,
        candidates: Vec<MatchCandidate>,
        result: &ScreeningResult,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let content = OutcomeContent {
            request_id: &result.request_id,
            input,
            datasets_checked: &result.datasets_checked,
            candidates: &candidates,
            decision: result.decision,
            risk_level: result.risk_level,
            top_score: result.top_score,
            reasons: &result.reasons,
        };
        let outcome_digest = OutcomeDigest::of(&CanonicalBytes::new(&content)?);
        Ok(Self {
            request_id: result.request_id.clone(),
            recorded_at,
            input: input.clone(),
            datasets_checked: result.datasets_checked.clone(),
            candidates,
            decision: result.decision,
            risk_level: result.risk_level,
            top_score: result.top_score,
            reasons: result.reasons.clone(),
            outcome_digest,
            rescreen_of: None,
        })
    }

    /// Mark this record as a re-screen superseding `prior`.
    pub fn as_rescreen_of(mut self, prior: OutcomeDigest) -> Self {
        self.rescreen_of = Some(prior);
        self
    }
}
