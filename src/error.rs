//! Error types for riskfeed
//!
//! A single error enum covering configuration, transport, and parsing
//! failures. Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for riskfeed operations
pub type Result<T> = std::result::Result<T, RiskFeedError>;

/// Error type for riskfeed operations
#[derive(Error, Debug)]
pub enum RiskFeedError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Feed fetch errors that are not plain transport failures
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Upstream returned a non-success status
    #[error("Upstream {upstream} returned HTTP {status}")]
    UpstreamStatus { upstream: &'static str, status: u16 },

    /// Parsing errors (feed payloads that are not valid JSON at all)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unknown feed source name in a query or CLI argument
    #[error("Unknown feed source: {0}")]
    UnknownSource(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors (config file)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited (with optional retry-after duration in seconds)
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl crate::feeds::retry::RetryableError for RiskFeedError {
    fn retry_decision(&self) -> crate::feeds::retry::RetryDecision {
        use crate::feeds::retry::RetryDecision;
        use std::time::Duration;

        match self {
            RiskFeedError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    RetryDecision::Retry
                } else if let Some(status) = e.status() {
                    match status.as_u16() {
                        429 => RetryDecision::RetryAfter(Duration::from_secs(60)),
                        500..=599 => RetryDecision::Retry,
                        _ => RetryDecision::NoRetry,
                    }
                } else {
                    RetryDecision::Retry
                }
            }
            RiskFeedError::UpstreamStatus { status, .. } => match status {
                429 => RetryDecision::RetryAfter(Duration::from_secs(60)),
                500..=599 => RetryDecision::Retry,
                _ => RetryDecision::NoRetry,
            },
            RiskFeedError::RateLimited(secs) => {
                RetryDecision::RetryAfter(Duration::from_secs(*secs))
            }
            // Everything else is a local or permanent failure
            _ => RetryDecision::NoRetry,
        }
    }
}
