//! Cached-or-fetch orchestration across all feed sources

use crate::cache::{Cache, CacheConfig, CacheStats};
use crate::config::FeedConfig;
use crate::feeds::cisa::KevClient;
use crate::feeds::github::AdvisoryClient;
use crate::feeds::nvd::NvdClient;
use crate::feeds::stats::StatsClient;
use crate::feeds::{
    fallback, AggregateResult, FeedData, FeedSource, Provenance, SourcedFeed,
};
use crate::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Aggregates all vulnerability feeds behind a shared TTL cache
///
/// Owns the cache exclusively; callers go through `get_source`,
/// `aggregate`, and `clear_cache`. For a given source the flow is: serve
/// the cached value while fresh, otherwise attempt one live fetch, and on
/// failure degrade to the static synthetic dataset (which is never written
/// to the cache, so the next call retries the live source).
pub struct FeedAggregator {
    cache: Cache,
    nvd: NvdClient,
    cisa: KevClient,
    github: AdvisoryClient,
    stats: StatsClient,
    /// Per-key guards collapsing duplicate concurrent fetches
    inflight: Mutex<HashMap<&'static str, Arc<Mutex<()>>>>,
}

impl FeedAggregator {
    /// Build an aggregator and its feed clients from the configuration
    pub fn new(config: &FeedConfig) -> Result<Self> {
        Ok(Self {
            cache: Cache::new(CacheConfig { ttl: config.ttl() }),
            nvd: NvdClient::new(config)?,
            cisa: KevClient::new(config)?,
            github: AdvisoryClient::new(config)?,
            stats: StatsClient::new(config)?,
            inflight: Mutex::new(HashMap::new()),
        })
    }

    /// Serve `key` from cache if fresh, else fetch, else fall back
    ///
    /// A failed fetch is logged and answered with `fallback()`; the fallback
    /// value is never cached. Concurrent calls for the same key are
    /// serialized on a per-key guard so only one live fetch is issued.
    pub async fn cached_or_fetch<F, Fut, FB>(
        &self,
        key: &'static str,
        fetch: F,
        fallback: FB,
    ) -> SourcedFeed
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FeedData>>,
        FB: FnOnce() -> FeedData,
    {
        if let Some(value) = self.cache.get_fresh(key).await {
            debug!(key, "Serving feed from cache");
            return SourcedFeed {
                data: value,
                source: Provenance::Cache,
            };
        }

        let gate = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(inflight.entry(key).or_default())
        };
        let _guard = gate.lock().await;

        // A concurrent caller may have filled the cache while we waited
        if let Some(value) = self.cache.get_fresh(key).await {
            debug!(key, "Feed cached by concurrent fetch");
            return SourcedFeed {
                data: value,
                source: Provenance::Cache,
            };
        }

        match fetch().await {
            Ok(data) => {
                self.cache.put(key, data.clone()).await;
                debug!(key, records = data.len(), "Feed fetched from upstream");
                SourcedFeed {
                    data,
                    source: Provenance::External,
                }
            }
            Err(e) => {
                warn!(key, error = %e, "Feed fetch failed, serving fallback data");
                SourcedFeed {
                    data: fallback(),
                    source: Provenance::Fallback,
                }
            }
        }
    }

    /// Cached-or-fetched result for a single source
    ///
    /// The OWASP list is static and returned synchronously without touching
    /// the cache.
    pub async fn get_source(&self, source: FeedSource) -> SourcedFeed {
        match source {
            FeedSource::Nvd => {
                let client = &self.nvd;
                self.cached_or_fetch(
                    source.key(),
                    || async move { Ok(FeedData::Nvd(client.fetch_recent().await?)) },
                    || FeedData::Nvd(fallback::nvd_fallback()),
                )
                .await
            }
            FeedSource::Cisa => {
                let client = &self.cisa;
                self.cached_or_fetch(
                    source.key(),
                    || async move { Ok(FeedData::Cisa(client.fetch_catalog().await?)) },
                    || FeedData::Cisa(fallback::kev_fallback()),
                )
                .await
            }
            FeedSource::Github => {
                let client = &self.github;
                self.cached_or_fetch(
                    source.key(),
                    || async move { Ok(FeedData::Github(client.fetch_advisories().await?)) },
                    || FeedData::Github(fallback::github_fallback()),
                )
                .await
            }
            FeedSource::Statistics => {
                let client = &self.stats;
                self.cached_or_fetch(
                    source.key(),
                    || async move { Ok(FeedData::Statistics(client.fetch_statistics().await?)) },
                    || FeedData::Statistics(fallback::stats_fallback()),
                )
                .await
            }
            FeedSource::Owasp => SourcedFeed {
                data: FeedData::Owasp(fallback::owasp_top10()),
                source: Provenance::Static,
            },
        }
    }

    /// Combined view across all sources
    ///
    /// The four fetched sources run concurrently; one branch failing never
    /// aborts the others, and the call itself never errors.
    pub async fn aggregate(&self) -> AggregateResult {
        let (nvd, cisa, github, statistics) = tokio::join!(
            self.get_source(FeedSource::Nvd),
            self.get_source(FeedSource::Cisa),
            self.get_source(FeedSource::Github),
            self.get_source(FeedSource::Statistics),
        );
        let owasp = self.get_source(FeedSource::Owasp).await;

        let sources = vec![
            provenance_label(FeedSource::Nvd, &nvd),
            provenance_label(FeedSource::Cisa, &cisa),
            provenance_label(FeedSource::Github, &github),
            provenance_label(FeedSource::Owasp, &owasp),
        ];

        AggregateResult {
            nvd,
            cisa,
            github,
            statistics,
            owasp,
            last_updated: Utc::now().to_rfc3339(),
            sources,
        }
    }

    /// Drop all cached entries so the next read re-fetches live data
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Cache state for the operator view
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

fn provenance_label(source: FeedSource, feed: &SourcedFeed) -> String {
    match feed.source {
        Provenance::Fallback => "Synthetic".to_string(),
        _ => source.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RiskFeedError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn test_config() -> FeedConfig {
        let mut config = FeedConfig::default();
        // Unreachable endpoints so live fetches fail fast without a network
        config.sources.nvd = "http://127.0.0.1:9".to_string();
        config.sources.cisa = "http://127.0.0.1:9".to_string();
        config.sources.github = "http://127.0.0.1:9".to_string();
        config.fetch.timeout_secs = 1;
        config.fetch.stats_timeout_secs = 1;
        config
    }

    fn sample() -> FeedData {
        FeedData::Nvd(fallback::nvd_fallback())
    }

    #[tokio::test]
    async fn test_fresh_cache_avoids_refetch() {
        let agg = FeedAggregator::new(&test_config()).unwrap();
        let calls = AtomicUsize::new(0);

        let first = agg
            .cached_or_fetch(
                "nvd",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(sample())
                },
                || panic!("fallback must not run"),
            )
            .await;
        assert_eq!(first.source, Provenance::External);

        let second = agg
            .cached_or_fetch(
                "nvd",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(sample())
                },
                || panic!("fallback must not run"),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.source, Provenance::Cache);
        assert_eq!(second.data, first.data);
    }

    #[tokio::test]
    async fn test_ttl_expiry_triggers_refetch() {
        // Config TTLs are whole seconds; swap in a millisecond-TTL cache so
        // the test does not sleep for real time
        let agg = FeedAggregator {
            cache: Cache::new(CacheConfig {
                ttl: Duration::from_millis(50),
            }),
            ..FeedAggregator::new(&test_config()).unwrap()
        };

        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            agg.cached_or_fetch(
                "nvd",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(sample())
                },
                || panic!("fallback must not run"),
            )
            .await;
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fallback_on_failure_is_not_cached() {
        let agg = FeedAggregator::new(&test_config()).unwrap();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result = agg
                .cached_or_fetch(
                    "nvd",
                    || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err(RiskFeedError::Fetch("boom".to_string()))
                    },
                    || sample(),
                )
                .await;
            assert_eq!(result.source, Provenance::Fallback);
        }

        // The second call retried the live source instead of serving a
        // cached fallback
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(agg.cache_stats().await.entry_count, 0);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let agg = FeedAggregator::new(&test_config()).unwrap();
        let calls = AtomicUsize::new(0);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample())
        };

        agg.cached_or_fetch("nvd", fetch, || panic!("no fallback")).await;
        agg.clear_cache().await;
        agg.cached_or_fetch("nvd", fetch, || panic!("no fallback")).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_collapse() {
        let agg = FeedAggregator::new(&test_config()).unwrap();
        let calls = AtomicUsize::new(0);

        let slow_fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(sample())
        };

        let (a, b) = tokio::join!(
            agg.cached_or_fetch("nvd", slow_fetch, || panic!("no fallback")),
            agg.cached_or_fetch("nvd", slow_fetch, || panic!("no fallback")),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.data, b.data);
        let sources = [a.source, b.source];
        assert!(sources.contains(&Provenance::External));
        assert!(sources.contains(&Provenance::Cache));
    }

    /// Minimal HTTP listener answering every request with the given JSON body
    async fn spawn_feed_stub(body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_aggregate_mixes_live_and_fallback_sources() {
        let url = spawn_feed_stub(
            r#"{"vulnerabilities": [{"cveID": "CVE-2024-1234", "vendorProject": "Acme"}]}"#,
        )
        .await;

        let mut config = test_config();
        config.sources.cisa = url;
        let agg = FeedAggregator::new(&config).unwrap();

        let result = agg.aggregate().await;
        assert_eq!(result.cisa.source, Provenance::External);
        assert_eq!(result.nvd.source, Provenance::Fallback);
        assert_eq!(result.github.source, Provenance::Fallback);
        assert_eq!(result.statistics.source, Provenance::Fallback);

        match &result.cisa.data {
            FeedData::Cisa(records) => assert_eq!(records[0].cve_id, "CVE-2024-1234"),
            other => panic!("unexpected payload: {:?}", other),
        }
        assert_eq!(result.sources[1], "CISA KEV");

        // Only the live result was cached; a second pass serves it from there
        let again = agg.aggregate().await;
        assert_eq!(again.cisa.source, Provenance::Cache);
        assert_eq!(agg.cache_stats().await.entry_count, 1);
    }

    #[tokio::test]
    async fn test_aggregate_degrades_per_source() {
        let agg = FeedAggregator::new(&test_config()).unwrap();

        // Seed one source so the combined view mixes provenance
        agg.cache.put(FeedSource::Nvd.key(), sample()).await;

        let result = agg.aggregate().await;
        assert_eq!(result.nvd.source, Provenance::Cache);
        assert_eq!(result.cisa.source, Provenance::Fallback);
        assert_eq!(result.github.source, Provenance::Fallback);
        assert_eq!(result.statistics.source, Provenance::Fallback);
        assert_eq!(result.owasp.source, Provenance::Static);

        assert!(!result.cisa.data.is_empty());
        assert_eq!(result.sources[0], "NVD");
        assert_eq!(result.sources[1], "Synthetic");
    }

    #[tokio::test]
    async fn test_owasp_is_static_and_uncached() {
        let agg = FeedAggregator::new(&test_config()).unwrap();

        let result = agg.get_source(FeedSource::Owasp).await;
        assert_eq!(result.source, Provenance::Static);
        assert_eq!(result.data.len(), 10);
        assert_eq!(agg.cache_stats().await.entry_count, 0);
    }
}
