//! # Matching Engine Adapter
//!
//! [`MatchingEngine`] abstracts the external engine behind two operations:
//! a readiness probe and a per-dataset match query. [`HttpMatchingEngine`]
//! is the production implementation over `reqwest`.
//!
//! ## Endpoints
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | GET | `/readyz` | 200 when the engine's indexes are loaded |
//! | POST | `/match/{dataset}` | score candidates for the `q1` query |
//!
//! ## Timeout
//!
//! Every call carries the client-wide timeout from [`EngineConfig`].
//! Retries are NOT built in: a failed dataset call fails the screen and the
//! caller decides whether to retry the whole request.

use std::future::Future;
use std::time::Instant;

use screening_core::{DatasetScope, MatchCandidate};

use crate::config::{ConfigError, EngineConfig};
use crate::error::MatchError;
use crate::query::QUERY_ID;
use crate::types::{MatchRequest, MatchResponse};

/// Upper bound on upstream error body bytes kept in errors and logs.
const MAX_ERROR_BODY: usize = 512;

/// Outcome of a readiness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady { reason: String },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The external entity-matching engine.
///
/// Implementations must be `Send + Sync + 'static` so a single instance can
/// be shared behind an `Arc` by every concurrent dataset task.
pub trait MatchingEngine: Send + Sync + 'static {
    /// Probe whether the engine can serve queries.
    fn readiness(&self) -> impl Future<Output = Readiness> + Send;

    /// Score candidates in one dataset. Malformed individual entries are
    /// dropped (and logged); anything else wrong with the call is an error.
    fn match_dataset(
        &self,
        dataset: &DatasetScope,
        request: &MatchRequest,
    ) -> impl Future<Output = Result<Vec<MatchCandidate>, MatchError>> + Send;
}

/// reqwest-backed engine client.
#[derive(Debug, Clone)]
pub struct HttpMatchingEngine {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpMatchingEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        let base_url = config.base_url.as_str().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            timeout_ms: u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_error(&self, dataset: &DatasetScope, e: reqwest::Error) -> MatchError {
        if e.is_timeout() {
            MatchError::Timeout {
                dataset: dataset.to_string(),
                timeout_ms: self.timeout_ms,
            }
        } else {
            MatchError::Transport {
                dataset: dataset.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl MatchingEngine for HttpMatchingEngine {
    async fn readiness(&self) -> Readiness {
        let url = format!("{}/readyz", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Readiness::Ready,
            Ok(resp) => Readiness::NotReady {
                reason: format!("matching engine returned status {}", resp.status().as_u16()),
            },
            Err(e) if e.is_timeout() => Readiness::NotReady {
                reason: "matching engine readiness probe timed out".into(),
            },
            Err(e) if e.is_connect() => Readiness::NotReady {
                reason: format!("cannot connect to matching engine: {e}"),
            },
            Err(e) => Readiness::NotReady {
                reason: format!("matching engine readiness probe failed: {e}"),
            },
        }
    }

    async fn match_dataset(
        &self,
        dataset: &DatasetScope,
        request: &MatchRequest,
    ) -> Result<Vec<MatchCandidate>, MatchError> {
        let url = format!("{}/match/{}", self.base_url, dataset);
        let started = Instant::now();

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(dataset, e))?;

        let status = resp.status();
        if !status.is_success() {
            let mut body = resp.text().await.unwrap_or_default();
            body.truncate(floor_char_boundary(&body, MAX_ERROR_BODY));
            tracing::warn!(
                dataset = %dataset,
                status = status.as_u16(),
                elapsed_ms = elapsed_ms(started),
                "matching engine rejected query"
            );
            return Err(MatchError::Status {
                dataset: dataset.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body: MatchResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(dataset, e)
            } else {
                MatchError::MalformedResponse {
                    dataset: dataset.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let (candidates, malformed) = body.take_query(dataset, QUERY_ID)?.into_candidates(dataset);
        for skipped in &malformed {
            tracing::warn!(
                dataset = %dataset,
                index = skipped.index,
                reason = %skipped.reason,
                "skipping malformed candidate"
            );
        }

        let top = candidates.iter().max_by(|a, b| a.score.total_cmp(&b.score));
        tracing::info!(
            dataset = %dataset,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms(started),
            query_fields = ?request.property_keys(QUERY_ID),
            match_count = candidates.len(),
            skipped = malformed.len(),
            top_score = top.map(|c| c.score).unwrap_or(0.0),
            top_entity_id = top.map(|c| c.entity_id.as_str()).unwrap_or(""),
            "matching engine query completed"
        );

        Ok(candidates)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Largest index `<= max` that falls on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let config = EngineConfig::new("http://127.0.0.1:8000/").unwrap();
        let engine = HttpMatchingEngine::new(&config).unwrap();
        assert_eq!(engine.base_url(), "http://127.0.0.1:8000");
    }

    #[test]
    fn floor_char_boundary_respects_utf8() {
        let s = "aé"; // 'é' is two bytes
        assert_eq!(floor_char_boundary(s, 2), 1);
        assert_eq!(floor_char_boundary(s, 10), 3);
        assert_eq!(floor_char_boundary("abc", 2), 2);
    }

    #[tokio::test]
    async fn readiness_reports_unreachable_engine() {
        // Port 1 is never listening; the connection is refused.
        let config = EngineConfig::new("http://127.0.0.1:1").unwrap().with_timeouts(
            std::time::Duration::from_millis(500),
            std::time::Duration::from_millis(200),
        );
        let engine = HttpMatchingEngine::new(&config).unwrap();
        assert!(!engine.readiness().await.is_ready());
    }
}
