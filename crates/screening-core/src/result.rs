//! # Screening Result
//!
//! The caller-visible outcome of one screen. Deliberately free of wall-clock
//! values: screening the same person twice against unchanged watchlists
//! yields an identical `ScreeningResult`.

use serde::{Deserialize, Serialize};

use crate::candidate::{DatasetScope, MatchCandidate};
use crate::decision::{RiskLevel, ScreeningDecision, Thresholds};
use crate::person::{PersonQuery, RequestId};

/// Outcome of screening one person.
///
/// # Invariants
///
/// - `top_score` is the maximum score over every candidate considered,
///   including those truncated out of `matches` (0.0 when none).
/// - `matches` is sorted by score descending, then `entity_id` ascending.
/// - Every `matches[i].dataset` is a member of `datasets_checked`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub request_id: RequestId,
    pub decision: ScreeningDecision,
    pub risk_level: RiskLevel,
    pub top_score: f64,
    pub matches: Vec<MatchCandidate>,
    pub reasons: Vec<String>,
    pub datasets_checked: Vec<DatasetScope>,
    pub metadata: ScreeningMetadata,
}

/// Context recorded next to a result for reviewers and auditors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningMetadata {
    /// Candidates considered after deduplication, before top-K truncation.
    pub total_candidates: usize,
    pub matches_returned: usize,
    pub thresholds: Thresholds,
    pub input_fields_provided: InputFieldsProvided,
}

/// Which identifying attributes the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFieldsProvided {
    pub name: bool,
    pub country: bool,
    pub date_of_birth: bool,
    pub passport_number: bool,
    pub national_id: bool,
}

impl InputFieldsProvided {
    pub fn of(query: &PersonQuery) -> Self {
        Self {
            name: true,
            country: query.country().is_some(),
            date_of_birth: query.date_of_birth().is_some(),
            passport_number: query.passport_number().is_some(),
            national_id: query.national_id().is_some(),
        }
    }
}
