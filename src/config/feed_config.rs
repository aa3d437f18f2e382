//! riskfeed configuration file handling
//!
//! Loads and manages the YAML configuration file. All sections and fields
//! are optional; defaults reproduce the standard deployment (30 minute TTL,
//! 10/15 second timeouts, 10 items per feed, no retries).

use crate::feeds::retry::RetryConfig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Cache behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Time-to-live for cached feed results, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    1800 // 30 minutes
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Fetch behavior shared by all feed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Per-request timeout for the NVD/CISA/GitHub feed pulls, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Per-request timeout for the larger CVE statistics pull, in seconds
    #[serde(default = "default_stats_timeout_secs")]
    pub stats_timeout_secs: u64,

    /// Maximum normalized records returned per feed
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Retry attempts after the initial fetch (0 = single attempt)
    #[serde(default)]
    pub max_retries: u32,

    /// User-Agent header sent to upstream feeds
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_stats_timeout_secs() -> u64 {
    15
}

fn default_max_items() -> usize {
    10
}

fn default_user_agent() -> String {
    "riskfeed/0.1".to_string()
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            stats_timeout_secs: default_stats_timeout_secs(),
            max_items: default_max_items(),
            max_retries: 0,
            user_agent: default_user_agent(),
        }
    }
}

/// Upstream feed endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUrls {
    /// NIST NVD CVE REST API base URL
    #[serde(default = "default_nvd_url")]
    pub nvd: String,

    /// CISA Known Exploited Vulnerabilities JSON feed URL
    #[serde(default = "default_cisa_url")]
    pub cisa: String,

    /// GitHub Security Advisories REST API URL
    #[serde(default = "default_github_url")]
    pub github: String,
}

fn default_nvd_url() -> String {
    "https://services.nvd.nist.gov/rest/json/cves/2.0".to_string()
}

fn default_cisa_url() -> String {
    "https://www.cisa.gov/sites/default/files/feeds/known_exploited_vulnerabilities.json"
        .to_string()
}

fn default_github_url() -> String {
    "https://api.github.com/advisories".to_string()
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            nvd: default_nvd_url(),
            cisa: default_cisa_url(),
            github: default_github_url(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind the feed server to
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// riskfeed configuration
///
/// Represents the complete YAML config file. Missing sections fall back to
/// their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Cache behavior
    #[serde(default)]
    pub cache: CacheSettings,

    /// Fetch behavior
    #[serde(default)]
    pub fetch: FetchSettings,

    /// Upstream feed endpoints
    #[serde(default)]
    pub sources: SourceUrls,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
}

impl FeedConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            crate::RiskFeedError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from an explicit path, or return defaults when no path is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), yaml)?;
        Ok(())
    }

    /// Cache TTL as a Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// Feed fetch timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Statistics fetch timeout as a Duration
    pub fn stats_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.stats_timeout_secs)
    }

    /// Retry policy derived from the fetch settings
    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.fetch.max_retries,
            ..RetryConfig::default()
        }
    }
}
