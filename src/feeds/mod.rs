//! Upstream feed clients and normalized record types
//!
//! One client per upstream source (NVD, CISA KEV, GitHub Advisories, plus a
//! larger NVD pull for derived statistics). Each client issues a bounded-time
//! HTTP GET, tolerates missing response fields via defaults, and truncates
//! results to keep payloads small. The fallback module holds the synthetic
//! datasets substituted when a live fetch fails.

pub mod cisa;
pub mod fallback;
pub mod github;
pub mod nvd;
pub mod records;
pub mod retry;
pub mod stats;

pub use records::{
    AdvisoryRecord, AggregateResult, CveStatistics, FeedData, FeedSource, KevRecord, NvdRecord,
    OwaspEntry, Provenance, SeverityCounts, SourcedFeed,
};

/// Truncate free text to at most `max` characters
///
/// Counts characters rather than bytes so multi-byte text never splits a
/// code point.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}
