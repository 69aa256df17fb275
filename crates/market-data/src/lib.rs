//! Tickerdeck Market Data Crate
//!
//! Per-tenant quote fetching for the tickerdeck price boards.
//!
//! # Overview
//!
//! This crate provides:
//! - A CoinMarketCap client keyed by a per-tenant API credential
//! - A TTL quote cache with stale fallback on upstream failure
//! - Minimum-interval rate limiting per credential
//! - Magnitude-aware USD price formatting
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   QuoteCache     |  (TTL cache, stale fallback, size sweep)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |   RateLimiter    |  (min-interval pacing, one per credential)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  QuoteProvider   |  (CmcProvider over HTTPS)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |      Quote       |  (immutable snapshot, market-cap ranked)
//! +------------------+
//! ```
//!
//! One [`QuoteCache`] serves one tenant credential; instances are never
//! shared across tenants because neither the limiter state nor the cache
//! entries are tenant-partitioned.

pub mod cache;
pub mod errors;
pub mod models;
pub mod provider;

pub use cache::{CacheConfig, QuoteCache, RateLimiter};
pub use errors::{FailureClass, QuoteError};
pub use models::{format_price, sort_by_market_cap, Quote};
pub use provider::{CmcProvider, QuoteProvider};
