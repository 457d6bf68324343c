//! Matching engine client error types.

/// Errors from matching engine calls.
///
/// Every variant except [`MatchError::NotReady`] is an upstream call
/// failure for one dataset and aborts the whole screen.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MatchError {
    /// The readiness probe failed; no dataset was queried.
    #[error("matching engine not ready: {reason}")]
    NotReady { reason: String },

    /// A dataset call exceeded its time budget.
    #[error("matching engine query for {dataset} timed out after {timeout_ms}ms")]
    Timeout { dataset: String, timeout_ms: u64 },

    /// Connection failure or other transport error.
    #[error("HTTP error querying {dataset}: {reason}")]
    Transport { dataset: String, reason: String },

    /// The engine answered with a non-2xx status.
    #[error("matching engine returned {status} for {dataset}: {body}")]
    Status {
        dataset: String,
        status: u16,
        body: String,
    },

    /// The response body could not be interpreted.
    #[error("malformed matching engine response for {dataset}: {reason}")]
    MalformedResponse { dataset: String, reason: String },
}

impl MatchError {
    /// Dataset the failure is attributed to, if any.
    pub fn dataset(&self) -> Option<&str> {
        match self {
            Self::NotReady { .. } => None,
            Self::Timeout { dataset, .. }
            | Self::Transport { dataset, .. }
            | Self::Status { dataset, .. }
            | Self::MalformedResponse { dataset, .. } => Some(dataset),
        }
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }
}
