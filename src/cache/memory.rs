//! In-memory cache implementation

use crate::feeds::FeedData;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live for cached values
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(1800), // 30 minutes
        }
    }
}

/// One cached feed result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: FeedData,
    pub stored_at: Instant,
}

impl CacheEntry {
    /// True iff the entry is younger than the given TTL
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// In-memory key/value cache shared across all feed sources
///
/// At most one entry exists per key; `put` overwrites. Mutations are guarded
/// by an RwLock so the cache is safe to share across server tasks.
#[derive(Debug)]
pub struct Cache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
}

impl Cache {
    /// Create an empty cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Look up an entry regardless of freshness
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Look up an entry and return its value only if still fresh
    pub async fn get_fresh(&self, key: &str) -> Option<FeedData> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.is_fresh(self.config.ttl))
            .map(|e| e.value.clone())
    }

    /// Store a value under `key`, overwriting any existing entry
    pub async fn put(&self, key: &str, value: FeedData) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Remove all entries; idempotent
    pub async fn clear(&self) {
        tracing::info!("Clearing feed cache");
        self.entries.write().await.clear();
    }

    /// Snapshot of cache state for the operator view
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let oldest_age = entries.values().map(|e| e.stored_at.elapsed()).max();

        CacheStats {
            entry_count: entries.len(),
            oldest_age,
            ttl: self.config.ttl,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entry_count: usize,
    pub oldest_age: Option<Duration>,
    pub ttl: Duration,
}
