//! Connection settings for the matching engine.

use std::time::Duration;

use url::Url;

/// Configuration for [`HttpMatchingEngine`](crate::HttpMatchingEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine base URL, e.g. `http://127.0.0.1:8000`.
    pub base_url: Url,
    /// Whole-request timeout for each call.
    pub timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

/// Invalid client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid matching engine URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl EngineConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

    /// Parse a base URL with default timeouts. Only `http` and `https`
    /// schemes are accepted.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }
        Ok(Self {
            base_url: parsed,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(Self::DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }

    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_urls() {
        let c = EngineConfig::new("http://127.0.0.1:8000").unwrap();
        assert_eq!(c.base_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(c.timeout, Duration::from_secs(15));
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(EngineConfig::new("not a url").is_err());
        assert!(EngineConfig::new("ftp://example.org").is_err());
    }
}
