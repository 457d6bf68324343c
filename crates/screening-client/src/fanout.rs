//! # Concurrent Dataset Fan-out
//!
//! [`MatchClient`] queries every configured dataset for one request:
//!
//! 1. Probe readiness once. A not-ready engine fails the request before
//!    any dataset is queried.
//! 2. Spawn one task per dataset on a `JoinSet`. A shared semaphore bounds
//!    how many calls are in flight across all requests.
//! 3. Each call runs under its own timeout.
//! 4. The first failure aborts the remaining tasks and is returned.
//!    No partial results escape.
//!
//! Results come back in configured dataset order regardless of completion
//! order, so downstream aggregation is deterministic.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use screening_core::{DatasetScope, MatchCandidate};

use crate::engine::{MatchingEngine, Readiness};
use crate::error::MatchError;
use crate::types::MatchRequest;

/// Candidates returned by one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetCandidates {
    pub dataset: DatasetScope,
    pub candidates: Vec<MatchCandidate>,
}

/// Fan-out client over a shared [`MatchingEngine`].
#[derive(Debug)]
pub struct MatchClient<E> {
    engine: Arc<E>,
    datasets: Vec<DatasetScope>,
    permits: Arc<Semaphore>,
    call_timeout: Duration,
}

impl<E> Clone for MatchClient<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            datasets: self.datasets.clone(),
            permits: Arc::clone(&self.permits),
            call_timeout: self.call_timeout,
        }
    }
}

impl<E: MatchingEngine> MatchClient<E> {
    /// `max_concurrency` of zero is treated as one.
    pub fn new(
        engine: Arc<E>,
        datasets: Vec<DatasetScope>,
        max_concurrency: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            datasets,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            call_timeout,
        }
    }

    pub fn datasets(&self) -> &[DatasetScope] {
        &self.datasets
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Pass-through readiness probe, used by health endpoints.
    pub async fn readiness(&self) -> Readiness {
        self.engine.readiness().await
    }

    /// Query every configured dataset. All-or-nothing.
    pub async fn fetch(&self, request: MatchRequest) -> Result<Vec<DatasetCandidates>, MatchError> {
        if let Readiness::NotReady { reason } = self.engine.readiness().await {
            tracing::warn!(%reason, "matching engine not ready; skipping dataset queries");
            return Err(MatchError::NotReady { reason });
        }

        let request = Arc::new(request);
        let timeout_ms = u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX);
        let mut tasks = JoinSet::new();

        for (index, dataset) in self.datasets.iter().cloned().enumerate() {
            let engine = Arc::clone(&self.engine);
            let permits = Arc::clone(&self.permits);
            let request = Arc::clone(&request);
            let call_timeout = self.call_timeout;
            let span = tracing::info_span!("dataset_query", dataset = %dataset);

            tasks.spawn(
                async move {
                    let outcome = match permits.acquire_owned().await {
                        Ok(_permit) => {
                            match tokio::time::timeout(
                                call_timeout,
                                engine.match_dataset(&dataset, &request),
                            )
                            .await
                            {
                                Ok(result) => result,
                                Err(_) => Err(MatchError::Timeout {
                                    dataset: dataset.to_string(),
                                    timeout_ms,
                                }),
                            }
                        }
                        Err(e) => Err(MatchError::Transport {
                            dataset: dataset.to_string(),
                            reason: e.to_string(),
                        }),
                    };
                    (index, dataset, outcome)
                }
                .instrument(span),
            );
        }

        let mut collected: Vec<Option<DatasetCandidates>> = vec![None; self.datasets.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, dataset, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tasks.abort_all();
                    return Err(MatchError::Transport {
                        dataset: "unknown".into(),
                        reason: format!("dataset task failed: {e}"),
                    });
                }
            };
            match outcome {
                Ok(candidates) => {
                    collected[index] = Some(DatasetCandidates { dataset, candidates });
                }
                Err(e) => {
                    tracing::warn!(dataset = %dataset, error = %e, "dataset query failed; aborting screen");
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(collected.into_iter().flatten().collect())
    }
}
