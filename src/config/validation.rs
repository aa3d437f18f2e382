//! Configuration validation
//!
//! Catches nonsensical values before the server or clients are built.

use super::FeedConfig;
use crate::{Result, RiskFeedError};

/// Validate a loaded configuration
///
/// # Errors
/// Returns `RiskFeedError::Config` describing the first invalid field.
pub fn validate_config(config: &FeedConfig) -> Result<()> {
    if config.cache.ttl_secs == 0 {
        return Err(RiskFeedError::Config(
            "cache.ttl_secs must be greater than zero".to_string(),
        ));
    }

    if config.fetch.timeout_secs == 0 || config.fetch.stats_timeout_secs == 0 {
        return Err(RiskFeedError::Config(
            "fetch timeouts must be greater than zero".to_string(),
        ));
    }

    if config.fetch.max_items == 0 {
        return Err(RiskFeedError::Config(
            "fetch.max_items must be greater than zero".to_string(),
        ));
    }

    for (name, url) in [
        ("sources.nvd", &config.sources.nvd),
        ("sources.cisa", &config.sources.cisa),
        ("sources.github", &config.sources.github),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RiskFeedError::Config(format!(
                "{} must be an http(s) URL, got '{}'",
                name, url
            )));
        }
    }

    if config.server.bind.is_empty() {
        return Err(RiskFeedError::Config(
            "server.bind must not be empty".to_string(),
        ));
    }

    Ok(())
}
