//! NIST NVD CVE feed client
//!
//! Pulls recent CVEs from the NVD 2.0 REST API and normalizes them into
//! `NvdRecord`s. Missing metrics default to a MEDIUM severity and a 5.0
//! score; only a fully un-parseable payload is treated as a fetch failure.

use super::records::NvdRecord;
use super::retry::{with_retry, RetryConfig};
use super::truncate;
use crate::config::FeedConfig;
use crate::{Result, RiskFeedError};
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Maximum characters kept from a CVE description
const MAX_DESCRIPTION: usize = 200;
/// Severity assigned when the upstream record has no CVSS metrics
const DEFAULT_SEVERITY: &str = "MEDIUM";
/// Score assigned when the upstream record has no CVSS metrics
const DEFAULT_SCORE: f64 = 5.0;
/// Page size requested for the recent-CVEs pull
const RESULTS_PER_PAGE: u32 = 20;

/// NVD API client
pub struct NvdClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    max_items: usize,
    retry: RetryConfig,
}

#[derive(Debug, Default, Deserialize)]
struct NvdResponse {
    #[serde(default)]
    vulnerabilities: Vec<NvdVulnerability>,
}

#[derive(Debug, Default, Deserialize)]
struct NvdVulnerability {
    #[serde(default)]
    cve: NvdCve,
}

#[derive(Debug, Default, Deserialize)]
struct NvdCve {
    #[serde(default)]
    id: String,
    #[serde(default)]
    descriptions: Vec<NvdDescription>,
    #[serde(default)]
    metrics: NvdMetrics,
    #[serde(default)]
    published: String,
}

#[derive(Debug, Default, Deserialize)]
struct NvdDescription {
    #[serde(default)]
    lang: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct NvdMetrics {
    #[serde(rename = "cvssMetricV31", default)]
    cvss_v31: Vec<NvdCvssMetric>,
    #[serde(rename = "cvssMetricV30", default)]
    cvss_v30: Vec<NvdCvssMetric>,
}

#[derive(Debug, Default, Deserialize)]
struct NvdCvssMetric {
    #[serde(rename = "cvssData", default)]
    cvss_data: NvdCvssData,
}

#[derive(Debug, Default, Deserialize)]
struct NvdCvssData {
    #[serde(rename = "baseSeverity")]
    base_severity: Option<String>,
    #[serde(rename = "baseScore")]
    base_score: Option<f64>,
}

impl NvdClient {
    /// Create a new NVD client from the shared configuration
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_str(&config.fetch.user_agent)
                        .map_err(|e| RiskFeedError::Config(format!("Invalid user agent: {}", e)))?,
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            base_url: config.sources.nvd.clone(),
            timeout: config.timeout(),
            max_items: config.fetch.max_items,
            retry: config.retry(),
        })
    }

    /// Fetch and normalize the recent-CVEs feed
    pub async fn fetch_recent(&self) -> Result<Vec<NvdRecord>> {
        with_retry(&self.retry, "nvd feed", || {
            self.fetch_page(RESULTS_PER_PAGE, self.max_items)
        })
        .await
    }

    /// Fetch one page of CVEs, normalized and capped to `max_items`
    pub(crate) async fn fetch_page(
        &self,
        per_page: u32,
        max_items: usize,
    ) -> Result<Vec<NvdRecord>> {
        debug!(url = %self.base_url, per_page, "Fetching NVD feed");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("resultsPerPage", per_page.to_string())])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RiskFeedError::UpstreamStatus {
                upstream: "nvd",
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_response(&body, max_items)
    }

    /// Override the per-request timeout (used by the statistics pull)
    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parse an NVD 2.0 response body into normalized records
///
/// Tolerates missing sub-fields via defaults; only a body that is not valid
/// JSON for the top-level shape fails.
pub fn parse_response(body: &str, max_items: usize) -> Result<Vec<NvdRecord>> {
    let response: NvdResponse = serde_json::from_str(body)
        .map_err(|e| RiskFeedError::Parse(format!("NVD response: {}", e)))?;

    Ok(response
        .vulnerabilities
        .into_iter()
        .take(max_items)
        .map(|v| normalize(v.cve))
        .collect())
}

fn normalize(cve: NvdCve) -> NvdRecord {
    let description = cve
        .descriptions
        .iter()
        .find(|d| d.lang == "en")
        .or_else(|| cve.descriptions.first())
        .map(|d| truncate(&d.value, MAX_DESCRIPTION))
        .unwrap_or_default();

    let cvss = cve
        .metrics
        .cvss_v31
        .first()
        .or_else(|| cve.metrics.cvss_v30.first())
        .map(|m| &m.cvss_data);

    let severity = cvss
        .and_then(|d| d.base_severity.clone())
        .unwrap_or_else(|| DEFAULT_SEVERITY.to_string());

    let score = cvss.and_then(|d| d.base_score).unwrap_or(DEFAULT_SCORE);

    NvdRecord {
        id: cve.id,
        description,
        severity,
        score,
        published: cve.published,
        source: "NVD".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_record() {
        let body = serde_json::json!({
            "vulnerabilities": [{
                "cve": {
                    "id": "CVE-2099-0001",
                    "descriptions": [{"lang": "en", "value": "x"}],
                    "metrics": {
                        "cvssMetricV31": [{
                            "cvssData": {"baseSeverity": "HIGH", "baseScore": 7.5}
                        }]
                    },
                    "published": "2099-01-01T00:00:00Z"
                }
            }]
        })
        .to_string();

        let records = parse_response(&body, 10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            NvdRecord {
                id: "CVE-2099-0001".to_string(),
                description: "x".to_string(),
                severity: "HIGH".to_string(),
                score: 7.5,
                published: "2099-01-01T00:00:00Z".to_string(),
                source: "NVD".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_metrics_get_defaults() {
        let body = serde_json::json!({
            "vulnerabilities": [{
                "cve": {
                    "id": "CVE-2099-0002",
                    "descriptions": [{"lang": "en", "value": "no metrics"}],
                    "published": "2099-02-01T00:00:00Z"
                }
            }]
        })
        .to_string();

        let records = parse_response(&body, 10).unwrap();
        assert_eq!(records[0].severity, "MEDIUM");
        assert_eq!(records[0].score, 5.0);
    }

    #[test]
    fn test_prefers_english_description() {
        let body = serde_json::json!({
            "vulnerabilities": [{
                "cve": {
                    "id": "CVE-2099-0003",
                    "descriptions": [
                        {"lang": "es", "value": "hola"},
                        {"lang": "en", "value": "hello"}
                    ]
                }
            }]
        })
        .to_string();

        let records = parse_response(&body, 10).unwrap();
        assert_eq!(records[0].description, "hello");
    }

    #[test]
    fn test_result_count_is_bounded() {
        let vulns: Vec<serde_json::Value> = (0..25)
            .map(|i| {
                serde_json::json!({"cve": {"id": format!("CVE-2099-{:04}", i)}})
            })
            .collect();
        let body = serde_json::json!({ "vulnerabilities": vulns }).to_string();

        let records = parse_response(&body, 10).unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].id, "CVE-2099-0000");
    }

    #[test]
    fn test_long_description_truncated() {
        let body = serde_json::json!({
            "vulnerabilities": [{
                "cve": {
                    "id": "CVE-2099-0004",
                    "descriptions": [{"lang": "en", "value": "d".repeat(500)}]
                }
            }]
        })
        .to_string();

        let records = parse_response(&body, 10).unwrap();
        assert_eq!(records[0].description.chars().count(), MAX_DESCRIPTION);
    }

    #[test]
    fn test_garbage_body_is_an_error() {
        assert!(parse_response("<html>rate limited</html>", 10).is_err());
    }

    #[test]
    fn test_empty_vulnerabilities_ok() {
        let records = parse_response("{}", 10).unwrap();
        assert!(records.is_empty());
    }
}
