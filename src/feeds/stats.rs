//! Derived CVE statistics
//!
//! Pulls a larger page of recent CVEs from NVD (with the longer statistics
//! timeout) and derives aggregate numbers: counts per severity bucket, the
//! count published in the trailing 30 days, and the mean CVSS score.

use super::nvd::NvdClient;
use super::records::{CveStatistics, NvdRecord, SeverityCounts};
use super::retry::{with_retry, RetryConfig};
use crate::config::FeedConfig;
use crate::Result;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::debug;

/// Page size for the statistics pull (larger than the feed view)
const STATS_RESULTS_PER_PAGE: u32 = 100;

/// CVE statistics client
pub struct StatsClient {
    nvd: NvdClient,
    retry: RetryConfig,
}

impl StatsClient {
    /// Create a new statistics client from the shared configuration
    pub fn new(config: &FeedConfig) -> Result<Self> {
        Ok(Self {
            nvd: NvdClient::new(config)?.with_timeout(config.stats_timeout()),
            retry: config.retry(),
        })
    }

    /// Fetch a large CVE page and derive statistics from it
    pub async fn fetch_statistics(&self) -> Result<CveStatistics> {
        let records = with_retry(&self.retry, "cve statistics", || {
            self.nvd.fetch_page(STATS_RESULTS_PER_PAGE, usize::MAX)
        })
        .await?;

        debug!(items = records.len(), "Computing CVE statistics");
        Ok(compute_statistics(&records, Utc::now()))
    }
}

/// Derive aggregate statistics from a normalized CVE list
///
/// `now` is passed in so the trailing-30-day window is deterministic in
/// tests. An empty list yields zeroed counts and a 0.0 mean score.
pub fn compute_statistics(records: &[NvdRecord], now: DateTime<Utc>) -> CveStatistics {
    let mut by_severity = SeverityCounts::default();
    let mut recent_30_days = 0;
    let mut score_sum = 0.0;

    let cutoff = now - Duration::days(30);

    for record in records {
        match record.severity.to_uppercase().as_str() {
            "CRITICAL" => by_severity.critical += 1,
            "HIGH" => by_severity.high += 1,
            "MEDIUM" => by_severity.medium += 1,
            "LOW" => by_severity.low += 1,
            _ => by_severity.unknown += 1,
        }

        if let Some(published) = parse_published(&record.published) {
            if published >= cutoff {
                recent_30_days += 1;
            }
        }

        score_sum += record.score;
    }

    let avg_cvss = if records.is_empty() {
        0.0
    } else {
        score_sum / records.len() as f64
    };

    CveStatistics {
        total: records.len(),
        by_severity,
        recent_30_days,
        avg_cvss,
        source: "NVD".to_string(),
    }
}

/// Parse an NVD published timestamp
///
/// NVD emits timestamps without a zone suffix ("2024-01-01T00:00:00.000");
/// those are taken as UTC. RFC 3339 strings are accepted too.
fn parse_published(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
