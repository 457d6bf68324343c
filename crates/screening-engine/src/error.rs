//! Screening failures surfaced to the caller.
//!
//! Malformed candidates and audit write failures are absorbed below this
//! layer and never appear here.

use screening_client::MatchError;
use screening_core::ValidationError;

/// Why a screen produced no decision.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScreeningError {
    /// The request itself is unusable. Not retryable.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The matching engine failed its readiness probe. Retryable.
    #[error("matching engine not ready: {reason}")]
    UpstreamNotReady { reason: String },

    /// A dataset call timed out, failed in transport, returned a non-2xx
    /// status or an unparseable body.
    #[error("upstream call failed for dataset {dataset}: {reason}")]
    UpstreamCallFailure { dataset: String, reason: String },
}

impl ScreeningError {
    /// Whether the same request may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidInput(_))
    }
}

impl From<MatchError> for ScreeningError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::NotReady { reason } => Self::UpstreamNotReady { reason },
            other => Self::UpstreamCallFailure {
                dataset: other.dataset().unwrap_or("unknown").to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_maps_to_upstream_not_ready() {
        let err: ScreeningError = MatchError::NotReady {
            reason: "warming up".into(),
        }
        .into();
        assert!(matches!(err, ScreeningError::UpstreamNotReady { ref reason } if reason == "warming up"));
        assert!(err.is_retryable());
    }

    #[test]
    fn dataset_failures_keep_attribution() {
        let err: ScreeningError = MatchError::Timeout {
            dataset: "un_sc_sanctions".into(),
            timeout_ms: 15_000,
        }
        .into();
        match err {
            ScreeningError::UpstreamCallFailure { dataset, reason } => {
                assert_eq!(dataset, "un_sc_sanctions");
                assert!(reason.contains("timed out"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_input_is_not_retryable() {
        let err = ScreeningError::from(ValidationError::EmptyFullName);
        assert!(!err.is_retryable());
    }
}
