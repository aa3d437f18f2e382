//! Cache layer for feed data
//!
//! In-memory caching of normalized feed results with a fixed time-to-live.
//! The keyspace is small and fixed (one key per upstream source), so stale
//! entries are simply treated as not fresh rather than proactively evicted.

mod memory;

pub use memory::{Cache, CacheConfig, CacheEntry, CacheStats};
