//! Upstream quote provider abstraction and implementation.
//!
//! This module contains:
//! - The `QuoteProvider` trait the cache layer depends on
//! - The CoinMarketCap client implementation
//!
//! Providers are deliberately thin: they turn one batch of symbols into one
//! HTTP request and parse the response. Pacing, caching, and stale fallback
//! live in the cache layer.

mod traits;

pub mod coinmarketcap;

pub use coinmarketcap::CmcProvider;
pub use traits::QuoteProvider;
