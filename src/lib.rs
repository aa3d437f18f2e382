//! riskfeed - Vulnerability feed aggregation with TTL caching
//!
//! riskfeed pulls a handful of public vulnerability feeds (NIST NVD, the CISA
//! Known Exploited Vulnerabilities catalog, GitHub Security Advisories),
//! normalizes them into bounded record lists, caches results in memory for a
//! fixed TTL, and serves them over a small HTTP API. Any upstream failure
//! degrades to static synthetic data rather than an error, so callers always
//! receive a well-formed response tagged with its provenance.
//!
//! # Architecture
//!
//! - **feeds**: per-source fetch clients, normalized record types, synthetic
//!   fallback datasets, retry/backoff policy
//! - **cache**: in-memory key/value store with a fixed time-to-live
//! - **aggregator**: cached-or-fetch orchestration and the combined view
//! - **server**: axum HTTP façade (`/feeds`, `/health`) with CORS
//! - **config**: YAML configuration with validated defaults

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod feeds;
pub mod logging;
pub mod server;

// Re-exports
pub use error::{Result, RiskFeedError};
