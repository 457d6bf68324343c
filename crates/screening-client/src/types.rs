//! # Wire Types for the Matching Engine
//!
//! Request side:
//!
//! ```json
//! {"queries": {"q1": {"schema": "Person", "properties": {"name": ["Jane Smith"]}}}}
//! ```
//!
//! `queries` is a map keyed by query id. The engine rejects a list payload
//! with a type error, so [`MatchRequest`] has no way to express one.
//!
//! Response side:
//!
//! ```json
//! {"responses": {"q1": {"status": 200, "results": [{"id": "...", "caption": "...",
//!   "score": 0.93, "match": true, "properties": {"name": ["..."]}}]}}}
//! ```
//!
//! Unknown fields are ignored everywhere. Result entries are kept as raw
//! JSON until [`QueryResponse::into_candidates`] parses them one by one, so a
//! single malformed entry is skipped rather than failing the dataset.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use screening_core::{DatasetScope, MatchCandidate};

use crate::error::MatchError;

/// Property carrying provenance links on a matched entity.
pub const SOURCE_URL_PROPERTY: &str = "sourceUrl";

// ── Request ─────────────────────────────────────────────────────────

/// Match payload sent to `POST /match/{dataset}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub queries: BTreeMap<String, EntityQuery>,
}

/// One structured entity description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQuery {
    pub schema: String,
    pub properties: BTreeMap<String, Vec<String>>,
}

impl MatchRequest {
    /// Property names carried by a query, for operational logging.
    pub fn property_keys(&self, query_id: &str) -> Vec<&str> {
        self.queries
            .get(query_id)
            .map(|q| q.properties.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

// ── Response ────────────────────────────────────────────────────────

/// Top-level match response.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchResponse {
    #[serde(default)]
    pub responses: HashMap<String, QueryResponse>,
}

/// Per-query section of a match response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub results: Vec<Value>,
}

/// Result entry fields we read. Everything else is ignored.
#[derive(Debug, Deserialize)]
struct RawCandidate {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, rename = "match")]
    is_match: Option<bool>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
}

/// A result entry that could not become a [`MatchCandidate`].
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedCandidate {
    pub index: usize,
    pub reason: String,
}

impl MatchResponse {
    /// Extract the section for `query_id`, enforcing its presence and a
    /// successful per-query status.
    pub fn take_query(
        mut self,
        dataset: &DatasetScope,
        query_id: &str,
    ) -> Result<QueryResponse, MatchError> {
        let section = self
            .responses
            .remove(query_id)
            .ok_or_else(|| MatchError::MalformedResponse {
                dataset: dataset.to_string(),
                reason: format!("response is missing query {query_id:?}"),
            })?;
        if let Some(status) = section.status {
            if !(200..300).contains(&status) {
                return Err(MatchError::Status {
                    dataset: dataset.to_string(),
                    status,
                    body: format!("query {query_id:?} reported status {status}"),
                });
            }
        }
        Ok(section)
    }
}

impl QueryResponse {
    /// Parse every result entry. Good entries become candidates tagged with
    /// `dataset`; bad entries are returned separately for logging.
    pub fn into_candidates(
        self,
        dataset: &DatasetScope,
    ) -> (Vec<MatchCandidate>, Vec<MalformedCandidate>) {
        let mut candidates = Vec::with_capacity(self.results.len());
        let mut malformed = Vec::new();
        for (index, entry) in self.results.into_iter().enumerate() {
            match parse_candidate(dataset, entry) {
                Ok(c) => candidates.push(c),
                Err(reason) => malformed.push(MalformedCandidate { index, reason }),
            }
        }
        (candidates, malformed)
    }
}

fn parse_candidate(dataset: &DatasetScope, entry: Value) -> Result<MatchCandidate, String> {
    let raw: RawCandidate = serde_json::from_value(entry).map_err(|e| e.to_string())?;

    let entity_id = raw
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or("missing entity id")?;
    let score = raw.score.ok_or("missing score")?;
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(format!("score {score} outside [0, 1]"));
    }

    let mut properties = BTreeMap::new();
    for (name, value) in raw.properties.unwrap_or_default() {
        let values = property_values(value);
        if !values.is_empty() {
            properties.insert(name, values);
        }
    }
    let source_urls = properties.get(SOURCE_URL_PROPERTY).cloned().unwrap_or_default();

    Ok(MatchCandidate {
        dataset: dataset.clone(),
        entity_id,
        caption: raw.caption.unwrap_or_default(),
        score,
        is_match: raw.is_match.unwrap_or(false),
        properties,
        source_urls,
    })
}

/// Flatten a property value into strings. Scalars are stringified; nested
/// entity objects and nulls are dropped.
fn property_values(value: Value) -> Vec<String> {
    fn scalar(v: Value) -> Option<String> {
        match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
    match value {
        Value::Array(items) => items.into_iter().filter_map(scalar).collect(),
        other => scalar(other).into_iter().collect(),
    }
}
