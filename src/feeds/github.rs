//! GitHub Security Advisories feed client
//!
//! Pulls the global advisories list from the GitHub REST API. Requires only
//! unauthenticated access; the ecosystem/package columns come from the first
//! affected package when present.

use super::records::AdvisoryRecord;
use super::retry::{with_retry, RetryConfig};
use super::truncate;
use crate::config::FeedConfig;
use crate::{Result, RiskFeedError};
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Maximum characters kept from an advisory description
const MAX_DESCRIPTION: usize = 200;
/// Severity assigned when the upstream advisory has none
const DEFAULT_SEVERITY: &str = "MEDIUM";

/// GitHub Advisories client
pub struct AdvisoryClient {
    client: Client,
    api_url: String,
    timeout: Duration,
    max_items: usize,
    retry: RetryConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RawAdvisory {
    #[serde(default)]
    ghsa_id: String,
    #[serde(default)]
    cve_id: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    updated_at: String,
    #[serde(default)]
    vulnerabilities: Vec<RawAdvisoryVuln>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAdvisoryVuln {
    #[serde(default)]
    package: Option<RawPackage>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPackage {
    #[serde(default)]
    ecosystem: String,
    #[serde(default)]
    name: String,
}

impl AdvisoryClient {
    /// Create a new advisories client from the shared configuration
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_str(&config.fetch.user_agent)
                        .map_err(|e| RiskFeedError::Config(format!("Invalid user agent: {}", e)))?,
                );
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/vnd.github+json"),
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            api_url: config.sources.github.clone(),
            timeout: config.timeout(),
            max_items: config.fetch.max_items,
            retry: config.retry(),
        })
    }

    /// Fetch and normalize the global advisories list
    pub async fn fetch_advisories(&self) -> Result<Vec<AdvisoryRecord>> {
        with_retry(&self.retry, "github advisories", || self.fetch_once()).await
    }

    async fn fetch_once(&self) -> Result<Vec<AdvisoryRecord>> {
        debug!(url = %self.api_url, "Fetching GitHub advisories");

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("per_page", self.max_items.to_string())])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RiskFeedError::UpstreamStatus {
                upstream: "github",
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_response(&body, self.max_items)
    }
}

/// Parse a GitHub advisories body into normalized records
pub fn parse_response(body: &str, max_items: usize) -> Result<Vec<AdvisoryRecord>> {
    let advisories: Vec<RawAdvisory> = serde_json::from_str(body)
        .map_err(|e| RiskFeedError::Parse(format!("GitHub advisories response: {}", e)))?;

    Ok(advisories
        .into_iter()
        .take(max_items)
        .map(normalize)
        .collect())
}

fn normalize(advisory: RawAdvisory) -> AdvisoryRecord {
    let (ecosystem, package) = advisory
        .vulnerabilities
        .first()
        .and_then(|v| v.package.as_ref())
        .map(|p| (p.ecosystem.clone(), p.name.clone()))
        .unwrap_or_default();

    AdvisoryRecord {
        id: advisory.ghsa_id,
        cve_id: advisory.cve_id.unwrap_or_default(),
        severity: advisory
            .severity
            .map(|s| s.to_uppercase())
            .unwrap_or_else(|| DEFAULT_SEVERITY.to_string()),
        summary: advisory.summary,
        description: truncate(
            advisory.description.as_deref().unwrap_or_default(),
            MAX_DESCRIPTION,
        ),
        published: advisory.published_at,
        updated: advisory.updated_at,
        ecosystem,
        package,
        source: "GitHub".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_advisory() {
        let body = serde_json::json!([{
            "ghsa_id": "GHSA-xxxx-yyyy-zzzz",
            "cve_id": "CVE-2024-5555",
            "severity": "high",
            "summary": "Path traversal in widget-io",
            "description": "A crafted archive can escape the extraction root.",
            "published_at": "2024-06-01T12:00:00Z",
            "updated_at": "2024-06-02T08:00:00Z",
            "vulnerabilities": [{
                "package": {"ecosystem": "npm", "name": "widget-io"}
            }]
        }])
        .to_string();

        let records = parse_response(&body, 10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "GHSA-xxxx-yyyy-zzzz");
        assert_eq!(records[0].severity, "HIGH");
        assert_eq!(records[0].ecosystem, "npm");
        assert_eq!(records[0].package, "widget-io");
        assert_eq!(records[0].source, "GitHub");
    }

    #[test]
    fn test_missing_optional_fields() {
        let body = serde_json::json!([{
            "ghsa_id": "GHSA-aaaa-bbbb-cccc",
            "summary": "No CVE yet"
        }])
        .to_string();

        let records = parse_response(&body, 10).unwrap();
        assert_eq!(records[0].cve_id, "");
        assert_eq!(records[0].severity, "MEDIUM");
        assert!(records[0].ecosystem.is_empty());
        assert!(records[0].package.is_empty());
    }

    #[test]
    fn test_list_is_bounded() {
        let advisories: Vec<serde_json::Value> = (0..40)
            .map(|i| serde_json::json!({"ghsa_id": format!("GHSA-{:04}", i)}))
            .collect();
        let body = serde_json::to_string(&advisories).unwrap();

        let records = parse_response(&body, 10).unwrap();
        assert_eq!(records.len(), 10);
    }

    #[test]
    fn test_garbage_body_is_an_error() {
        assert!(parse_response("{\"message\": \"rate limited\"}", 10).is_err());
    }
}
