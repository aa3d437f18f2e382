//! Normalized feed record types
//!
//! Each upstream feed keeps its own record shape; there is no shared schema.
//! Every record carries a `source` tag identifying provenance ("NVD",
//! "CISA KEV", "GitHub", or "Synthetic" when produced by the fallback path).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The feed sources known to the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedSource {
    Nvd,
    Cisa,
    Github,
    Statistics,
    Owasp,
}

impl FeedSource {
    /// Cache key for this source
    pub fn key(&self) -> &'static str {
        match self {
            FeedSource::Nvd => "nvd",
            FeedSource::Cisa => "cisa",
            FeedSource::Github => "github",
            FeedSource::Statistics => "cve-stats",
            FeedSource::Owasp => "owasp",
        }
    }

    /// Human-readable upstream label
    pub fn label(&self) -> &'static str {
        match self {
            FeedSource::Nvd => "NVD",
            FeedSource::Cisa => "CISA KEV",
            FeedSource::Github => "GitHub",
            FeedSource::Statistics => "NVD",
            FeedSource::Owasp => "OWASP",
        }
    }
}

impl FromStr for FeedSource {
    type Err = crate::RiskFeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nvd" => Ok(FeedSource::Nvd),
            "cisa" | "kev" => Ok(FeedSource::Cisa),
            "github" => Ok(FeedSource::Github),
            "statistics" | "cve-stats" | "stats" => Ok(FeedSource::Statistics),
            "owasp" => Ok(FeedSource::Owasp),
            other => Err(crate::RiskFeedError::UnknownSource(other.to_string())),
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How a returned result was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Served from a fresh cache entry
    Cache,
    /// Fetched live from the upstream feed
    External,
    /// Synthetic data substituted after a fetch failure
    Fallback,
    /// Compile-time data that never changes at runtime (OWASP list)
    Static,
}

/// Normalized NVD CVE record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NvdRecord {
    pub id: String,
    pub description: String,
    pub severity: String,
    pub score: f64,
    pub published: String,
    pub source: String,
}

/// Normalized CISA Known Exploited Vulnerabilities record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KevRecord {
    #[serde(rename = "cveID")]
    pub cve_id: String,
    pub vendor_project: String,
    pub product: String,
    pub vulnerability_name: String,
    pub date_added: String,
    pub short_description: String,
    pub required_action: String,
    pub source: String,
}

/// Normalized GitHub security advisory record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRecord {
    pub id: String,
    pub cve_id: String,
    pub severity: String,
    pub summary: String,
    pub description: String,
    pub published: String,
    pub updated: String,
    pub ecosystem: String,
    pub package: String,
    pub source: String,
}

/// CVE counts per severity bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityCounts {
    #[serde(rename = "CRITICAL")]
    pub critical: usize,
    #[serde(rename = "HIGH")]
    pub high: usize,
    #[serde(rename = "MEDIUM")]
    pub medium: usize,
    #[serde(rename = "LOW")]
    pub low: usize,
    #[serde(rename = "UNKNOWN")]
    pub unknown: usize,
}

impl SeverityCounts {
    /// Total across all buckets
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.unknown
    }
}

/// Derived CVE statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CveStatistics {
    pub total: usize,
    pub by_severity: SeverityCounts,
    #[serde(rename = "recent30Days")]
    pub recent_30_days: usize,
    #[serde(rename = "avgCVSS")]
    pub avg_cvss: f64,
    pub source: String,
}

/// One entry of the static OWASP Top-10 list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwaspEntry {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Typed per-source payload
///
/// Serialized untagged so the wire shape is just the record list (or the
/// statistics object) the dashboard expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedData {
    Nvd(Vec<NvdRecord>),
    Cisa(Vec<KevRecord>),
    Github(Vec<AdvisoryRecord>),
    Statistics(CveStatistics),
    Owasp(Vec<OwaspEntry>),
}

impl FeedData {
    /// Number of records carried (1 for the statistics object)
    pub fn len(&self) -> usize {
        match self {
            FeedData::Nvd(v) => v.len(),
            FeedData::Cisa(v) => v.len(),
            FeedData::Github(v) => v.len(),
            FeedData::Statistics(_) => 1,
            FeedData::Owasp(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A feed payload together with how it was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcedFeed {
    pub data: FeedData,
    pub source: Provenance,
}

/// Combined result across all configured sources
///
/// Always fully populated: a failed fetch degrades to fallback data rather
/// than omitting the key.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub nvd: SourcedFeed,
    pub cisa: SourcedFeed,
    pub github: SourcedFeed,
    pub statistics: SourcedFeed,
    pub owasp: SourcedFeed,
    pub last_updated: String,
    pub sources: Vec<String>,
}
