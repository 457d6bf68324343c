//! # Service Configuration
//!
//! Command-line flags with `SCREENING_*` environment fallbacks. A `.env`
//! file in the working directory is loaded by the binary before parsing.
//! Values are validated once into the immutable configs the engine and
//! client crates consume; an unusable value aborts startup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use screening_client::EngineConfig;
use screening_core::{DatasetScope, Thresholds, ValidationError};
use screening_engine::{AuditError, ScreeningConfig};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Sanctions watchlist screening service.
#[derive(Debug, Clone, Parser)]
#[command(name = "screening-api", version, about)]
pub struct AppConfig {
    /// Listen address.
    #[arg(long, env = "SCREENING_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port.
    #[arg(long, env = "SCREENING_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Matching engine base URL.
    #[arg(long, env = "SCREENING_UPSTREAM_URL", default_value = "http://127.0.0.1:8000")]
    pub upstream_url: String,

    /// Comma-separated watchlist datasets queried for every screen.
    #[arg(long, env = "SCREENING_DATASETS", default_value = ScreeningConfig::DEFAULT_DATASETS)]
    pub datasets: String,

    /// Score at which a non-actionable match raises the risk tier above none.
    #[arg(long, env = "SCREENING_INFO_SCORE", default_value_t = Thresholds::DEFAULT_INFO)]
    pub info_score: f64,

    /// Score at or above which a screen is sent to manual review.
    #[arg(long, env = "SCREENING_REVIEW_SCORE", default_value_t = Thresholds::DEFAULT_REVIEW)]
    pub review_score: f64,

    /// Score at or above which a screen is blocked.
    #[arg(long, env = "SCREENING_BLOCK_SCORE", default_value_t = Thresholds::DEFAULT_BLOCK)]
    pub block_score: f64,

    /// Matches returned to the caller.
    #[arg(long, env = "SCREENING_MAX_MATCHES", default_value_t = ScreeningConfig::DEFAULT_MAX_MATCHES)]
    pub max_matches: usize,

    /// Per dataset call timeout in seconds.
    #[arg(long, env = "SCREENING_UPSTREAM_TIMEOUT_SECS", default_value_t = EngineConfig::DEFAULT_TIMEOUT_SECS)]
    pub upstream_timeout_secs: u64,

    /// Connect timeout in seconds.
    #[arg(long, env = "SCREENING_CONNECT_TIMEOUT_SECS", default_value_t = EngineConfig::DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_secs: u64,

    /// Upstream calls allowed in flight across all requests.
    #[arg(long, env = "SCREENING_MAX_CONCURRENCY", default_value_t = ScreeningConfig::DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// JSON Lines audit log path. Created, with parent directories, if absent.
    #[arg(long, env = "SCREENING_AUDIT_LOG", default_value = AppConfig::DEFAULT_AUDIT_LOG)]
    pub audit_log: PathBuf,

    /// Tracing output format.
    #[arg(long, env = "SCREENING_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

/// Configuration that cannot be turned into a running service.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Screening(#[from] screening_engine::ConfigError),

    #[error(transparent)]
    Engine(#[from] screening_client::ConfigError),

    #[error("cannot open audit log: {0}")]
    Audit(#[from] AuditError),

    #[error("metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl AppConfig {
    pub const DEFAULT_AUDIT_LOG: &'static str = "screening-audit.jsonl";

    pub fn screening_config(&self) -> Result<ScreeningConfig, ConfigError> {
        let mut config = ScreeningConfig::with_datasets(DatasetScope::parse_list(&self.datasets)?);
        config.thresholds = Thresholds::new(self.info_score, self.review_score, self.block_score)?;
        config.max_matches = self.max_matches;
        config.call_timeout = Duration::from_secs(self.upstream_timeout_secs);
        config.max_concurrency = self.max_concurrency;
        config.validate()?;
        Ok(config)
    }

    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        Ok(EngineConfig::new(&self.upstream_url)?.with_timeouts(
            Duration::from_secs(self.upstream_timeout_secs),
            Duration::from_secs(self.connect_timeout_secs),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        let mut argv = vec!["screening-api"];
        argv.extend_from_slice(args);
        AppConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--port",
            "9000",
            "--datasets",
            "eu_fsf, us_ofac_sdn",
            "--review-score",
            "0.7",
            "--max-matches",
            "3",
        ]);
        assert_eq!(config.port, 9000);
        let screening = config.screening_config().unwrap();
        assert_eq!(screening.datasets.len(), 2);
        assert_eq!(screening.datasets[0].as_str(), "eu_fsf");
        assert_eq!(screening.thresholds.review(), 0.7);
        assert_eq!(screening.max_matches, 3);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let config = parse(&["--review-score", "0.95", "--block-score", "0.9"]);
        assert!(matches!(
            config.screening_config(),
            Err(ConfigError::Validation(ValidationError::InvalidThresholds(_)))
        ));
    }

    #[test]
    fn zero_max_matches_is_rejected() {
        let config = parse(&["--max-matches", "0"]);
        assert!(matches!(config.screening_config(), Err(ConfigError::Screening(_))));
    }

    #[test]
    fn bad_upstream_url_is_rejected() {
        let config = parse(&["--upstream-url", "ftp://engine"]);
        assert!(matches!(config.engine_config(), Err(ConfigError::Engine(_))));
    }

    #[test]
    fn audit_log_defaults_to_a_file() {
        assert_eq!(parse(&[]).audit_log, PathBuf::from(AppConfig::DEFAULT_AUDIT_LOG));
        assert_eq!(
            parse(&["--audit-log", "/var/log/screening/audit.jsonl"]).audit_log,
            PathBuf::from("/var/log/screening/audit.jsonl")
        );
    }

    #[test]
    fn log_format_parses() {
        assert_eq!(parse(&["--log-format", "json"]).log_format, LogFormat::Json);
    }
}
