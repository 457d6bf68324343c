//! # Screening Orchestration
//!
//! [`Screener::screen_person`] runs one request end to end:
//!
//! 1. Resolve the request id (caller-supplied or a fresh UUID v4).
//! 2. Build the match payload and fan out to every configured dataset.
//! 3. Aggregate, classify and cut the visible result to top-K.
//! 4. Record the audit snapshot, then return.
//!
//! The whole run is wrapped in a `screen_person` tracing span carrying the
//! request id, so per-dataset events inherit it.

use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;

use screening_client::{build_match_request, MatchClient, MatchingEngine, Readiness};
use screening_core::{
    AuditRecord, InputFieldsProvided, MatchCandidate, PersonQuery, RequestId, ScreeningMetadata,
    ScreeningResult,
};

use crate::aggregate::aggregate;
use crate::audit::{AuditRecorder, AuditSink, AuditStatus};
use crate::classify::classify;
use crate::config::ScreeningConfig;
use crate::error::ScreeningError;

/// A decision together with what happened to its audit write.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningOutcome {
    pub result: ScreeningResult,
    pub audit: AuditStatus,
}

/// The screening decision service.
pub struct Screener<E> {
    client: MatchClient<E>,
    config: Arc<ScreeningConfig>,
    recorder: Arc<AuditRecorder>,
}

impl<E> Clone for Screener<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            recorder: Arc::clone(&self.recorder),
        }
    }
}

impl<E> std::fmt::Debug for Screener<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screener")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: MatchingEngine> Screener<E> {
    /// `config` should already have passed [`ScreeningConfig::validate`].
    pub fn new(engine: Arc<E>, config: ScreeningConfig, sink: Arc<dyn AuditSink>) -> Self {
        let client = MatchClient::new(
            engine,
            config.datasets.clone(),
            config.max_concurrency,
            config.call_timeout,
        );
        Self {
            client,
            config: Arc::new(config),
            recorder: Arc::new(AuditRecorder::new(sink)),
        }
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Probe the matching engine without screening anyone.
    pub async fn readiness(&self) -> Readiness {
        self.client.readiness().await
    }

    /// Screen one person. Safe to retry with the same request id.
    pub async fn screen_person(
        &self,
        query: PersonQuery,
    ) -> Result<ScreeningOutcome, ScreeningError> {
        let request_id = query
            .request_id()
            .cloned()
            .unwrap_or_else(RequestId::generate);
        let span = tracing::info_span!("screen_person", request_id = %request_id);
        self.run(request_id, query).instrument(span).await
    }

    async fn run(
        &self,
        request_id: RequestId,
        query: PersonQuery,
    ) -> Result<ScreeningOutcome, ScreeningError> {
        let request = build_match_request(&query);
        let per_dataset = self.client.fetch(request).await.map_err(|e| {
            tracing::warn!(error = %e, "screen failed upstream; no decision issued");
            ScreeningError::from(e)
        })?;

        let ranked = aggregate(per_dataset);
        let classification = classify(ranked.all(), &self.config.thresholds);
        let matches = ranked.top(self.config.max_matches).to_vec();

        let result = ScreeningResult {
            request_id,
            decision: classification.decision,
            risk_level: classification.risk_level,
            top_score: classification.top_score,
            metadata: ScreeningMetadata {
                total_candidates: ranked.len(),
                matches_returned: matches.len(),
                thresholds: self.config.thresholds,
                input_fields_provided: InputFieldsProvided::of(&query),
            },
            matches,
            reasons: classification.reasons,
            datasets_checked: self.config.datasets.clone(),
        };

        let audit = self.record(&query, ranked.into_vec(), &result).await;

        tracing::info!(
            decision = %result.decision,
            risk_level = %result.risk_level,
            top_score = result.top_score,
            total_candidates = result.metadata.total_candidates,
            datasets = result.datasets_checked.len(),
            audit = audit.as_str(),
            "screen completed"
        );
        Ok(ScreeningOutcome { result, audit })
    }

    async fn record(
        &self,
        query: &PersonQuery,
        candidates: Vec<MatchCandidate>,
        result: &ScreeningResult,
    ) -> AuditStatus {
        let record = match AuditRecord::new(query, candidates, result, Utc::now()) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(error = %e, "audit record could not be built");
                return AuditStatus::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let recorder = Arc::clone(&self.recorder);
        let span = tracing::Span::current();
        match tokio::task::spawn_blocking(move || span.in_scope(|| recorder.record(record))).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(error = %e, "audit task failed");
                AuditStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
