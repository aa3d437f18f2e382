//! Configuration system
//!
//! Loads an optional YAML config file with sections for the cache TTL,
//! fetch behavior (timeouts, item caps, retries), upstream feed URLs, and
//! the HTTP server bind address. Every field has a default matching the
//! shipped behavior, so running with no config file at all is supported.

mod feed_config;
pub mod validation;

pub use feed_config::{CacheSettings, FeedConfig, FetchSettings, ServerSettings, SourceUrls};
pub use validation::validate_config;
