//! # Dataset Scopes and Match Candidates

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Property holding sanctions program codes on a matched entity.
pub const PROGRAM_PROPERTY: &str = "program";

/// Name of one watchlist partition known to the matching engine
/// (e.g. `us_ofac_sdn`).
///
/// The value is used verbatim as a URL path segment, so it is restricted to
/// ASCII letters, digits, `_`, `-` and `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DatasetScope(String);

impl DatasetScope {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(ValidationError::InvalidDatasetScope(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse a comma-separated list of scopes, ignoring blank entries and
    /// dropping repeats while keeping first-seen order.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, ValidationError> {
        let mut scopes: Vec<Self> = Vec::new();
        for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
            let scope = Self::new(part)?;
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
        Ok(scopes)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for DatasetScope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for DatasetScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entity returned by the matching engine as potentially being the
/// screened person.
///
/// `entity_id` is unique only within `dataset`; the identity of a candidate
/// is the pair returned by [`MatchCandidate::key`]. `score` is always a
/// finite value in `[0.0, 1.0]`; entries that violate this are rejected
/// while parsing the upstream response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub dataset: DatasetScope,
    pub entity_id: String,
    pub caption: String,
    pub score: f64,
    /// The engine's own match verdict, independent of our thresholds.
    pub is_match: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub source_urls: Vec<String>,
}

impl MatchCandidate {
    /// Identity of this candidate across a merged result set.
    pub fn key(&self) -> (&DatasetScope, &str) {
        (&self.dataset, &self.entity_id)
    }

    /// Values of a multi-valued property; empty when absent.
    pub fn property(&self, name: &str) -> &[String] {
        self.properties.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sanctions program codes attached to the entity.
    pub fn programs(&self) -> &[String] {
        self.property(PROGRAM_PROPERTY)
    }
}
