//! Immutable screening configuration, validated once at startup.

use std::time::Duration;

use screening_core::{DatasetScope, Thresholds};

/// Decision engine settings shared by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningConfig {
    /// Watchlist partitions queried for every screen, in report order.
    pub datasets: Vec<DatasetScope>,
    pub thresholds: Thresholds,
    /// Matches returned to the caller (top-K). The audit record keeps all.
    pub max_matches: usize,
    /// Budget for each dataset call.
    pub call_timeout: Duration,
    /// Upstream calls allowed in flight across all requests.
    pub max_concurrency: usize,
}

/// A configuration value that cannot be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one dataset must be configured")]
    NoDatasets,

    #[error("max_matches must be at least 1")]
    ZeroMaxMatches,

    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("call timeout must be greater than zero")]
    ZeroTimeout,
}

impl ScreeningConfig {
    pub const DEFAULT_DATASETS: &'static str = "us_ofac_sdn,un_sc_sanctions";
    pub const DEFAULT_MAX_MATCHES: usize = 5;
    pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 15;
    pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

    /// Configuration with defaults for everything except `datasets`.
    pub fn with_datasets(datasets: Vec<DatasetScope>) -> Self {
        Self {
            datasets,
            thresholds: Thresholds::default(),
            max_matches: Self::DEFAULT_MAX_MATCHES,
            call_timeout: Duration::from_secs(Self::DEFAULT_CALL_TIMEOUT_SECS),
            max_concurrency: Self::DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.datasets.is_empty() {
            return Err(ConfigError::NoDatasets);
        }
        if self.max_matches == 0 {
            return Err(ConfigError::ZeroMaxMatches);
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.call_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
