//! HTTP façade for the feed aggregator
//!
//! The only surface external callers use: by-source lookup, the full
//! aggregate, and cache invalidation, with permissive CORS for the
//! dashboard UI.

mod http;

pub use http::{ErrorResponse, FeedServer};
