//! Feed aggregation layer
//!
//! Orchestrates cached-or-fetch calls across all configured sources,
//! tolerating partial failure and assembling the combined result.

mod feed_aggregator;

pub use feed_aggregator::FeedAggregator;
