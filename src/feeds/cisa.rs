//! CISA Known Exploited Vulnerabilities feed client
//!
//! The KEV catalog is a single JSON document; the client pulls it whole,
//! keeps the first few entries, and trims free-text fields.

use super::records::KevRecord;
use super::retry::{with_retry, RetryConfig};
use super::truncate;
use crate::config::FeedConfig;
use crate::{Result, RiskFeedError};
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Maximum characters kept from the short description
const MAX_SHORT_DESCRIPTION: usize = 150;
/// Maximum characters kept from the required-action text
const MAX_REQUIRED_ACTION: usize = 200;

/// CISA KEV feed client
pub struct KevClient {
    client: Client,
    feed_url: String,
    timeout: Duration,
    max_items: usize,
    retry: RetryConfig,
}

#[derive(Debug, Default, Deserialize)]
struct KevResponse {
    #[serde(default)]
    vulnerabilities: Vec<RawKevEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct RawKevEntry {
    #[serde(rename = "cveID", default)]
    cve_id: String,
    #[serde(rename = "vendorProject", default)]
    vendor_project: String,
    #[serde(default)]
    product: String,
    #[serde(rename = "vulnerabilityName", default)]
    vulnerability_name: String,
    #[serde(rename = "dateAdded", default)]
    date_added: String,
    #[serde(rename = "shortDescription", default)]
    short_description: String,
    #[serde(rename = "requiredAction", default)]
    required_action: String,
}

impl KevClient {
    /// Create a new KEV client from the shared configuration
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
            feed_url: config.sources.cisa.clone(),
            timeout: config.timeout(),
            max_items: config.fetch.max_items,
            retry: config.retry(),
        })
    }

    /// Fetch and normalize the KEV catalog
    pub async fn fetch_catalog(&self) -> Result<Vec<KevRecord>> {
        with_retry(&self.retry, "cisa kev feed", || self.fetch_once()).await
    }

    async fn fetch_once(&self) -> Result<Vec<KevRecord>> {
        debug!(url = %self.feed_url, "Fetching CISA KEV catalog");

        let response = self
            .client
            .get(&self.feed_url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RiskFeedError::UpstreamStatus {
                upstream: "cisa",
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_response(&body, self.max_items)
    }
}

/// Parse a KEV catalog body into normalized records
pub fn parse_response(body: &str, max_items: usize) -> Result<Vec<KevRecord>> {
    let response: KevResponse = serde_json::from_str(body)
        .map_err(|e| RiskFeedError::Parse(format!("KEV response: {}", e)))?;

    Ok(response
        .vulnerabilities
        .into_iter()
        .take(max_items)
        .map(normalize)
        .collect())
}

fn normalize(entry: RawKevEntry) -> KevRecord {
    KevRecord {
        cve_id: entry.cve_id,
        vendor_project: entry.vendor_project,
        product: entry.product,
        vulnerability_name: entry.vulnerability_name,
        date_added: entry.date_added,
        short_description: truncate(&entry.short_description, MAX_SHORT_DESCRIPTION),
        required_action: truncate(&entry.required_action, MAX_REQUIRED_ACTION),
        source: "CISA KEV".to_string(),
    }
}
