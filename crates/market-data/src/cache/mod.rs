//! Per-tenant TTL quote cache.
//!
//! This module provides:
//! - [`QuoteCache`]: TTL-bounded cache over a [`QuoteProvider`], with
//!   limiter-paced upstream fetches and stale fallback on failure
//! - [`RateLimiter`]: minimum-interval pacing for one upstream credential
//!
//! One instance serves one tenant credential. Instances must not be shared
//! across tenants: neither the rate limiter state nor the cache entries
//! are tenant-partitioned within an instance.

mod rate_limiter;

pub use rate_limiter::RateLimiter;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, error, warn};

use crate::errors::{FailureClass, QuoteError};
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Default entry lifetime, in seconds.
const DEFAULT_TTL_SECS: f64 = 300.0;

/// Default cap on cached entries.
const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Cache tuning knobs.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Entry lifetime in seconds. Entries at least this old are evicted.
    pub ttl_secs: f64,
    /// Maximum number of entries kept after a sweep.
    pub max_entries: usize,
    /// Minimum spacing between upstream requests.
    pub min_request_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
            min_request_interval: Duration::from_secs(1),
        }
    }
}

/// One cached batch of quotes.
///
/// Replaced wholesale on refresh, never partially mutated. The quote order
/// is the upstream response order and carries no meaning.
#[derive(Clone, Debug)]
struct CacheEntry {
    quotes: Vec<Quote>,
    /// Seconds since the epoch at store time. Access never refreshes it.
    timestamp: f64,
}

/// TTL cache over an upstream quote provider.
///
/// Keys are canonicalized symbol batches (uppercased, sorted, deduplicated,
/// comma-joined), so the same set of symbols always hits the same entry
/// regardless of request order or casing.
pub struct QuoteCache {
    provider: Arc<dyn QuoteProvider>,
    limiter: RateLimiter,
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl_secs: f64,
    max_entries: usize,
}

impl QuoteCache {
    /// Create a cache with default limits over the given provider.
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self::with_config(provider, CacheConfig::default())
    }

    /// Create a cache with custom limits.
    pub fn with_config(provider: Arc<dyn QuoteProvider>, config: CacheConfig) -> Self {
        Self {
            provider,
            limiter: RateLimiter::with_interval(config.min_request_interval),
            entries: Mutex::new(HashMap::new()),
            ttl_secs: config.ttl_secs,
            max_entries: config.max_entries,
        }
    }

    /// Canonical cache key for a symbol batch.
    fn cache_key(symbols: &[String]) -> String {
        let mut normalized: Vec<String> = symbols.iter().map(|s| s.to_uppercase()).collect();
        normalized.sort();
        normalized.dedup();
        normalized.join(",")
    }

    /// Lock the entry map, recovering from poison if necessary.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("quote cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Age/size sweep, run at the start of every cached fetch.
    ///
    /// Expired entries go first; if the survivors still exceed the size
    /// bound, the oldest-timestamped entries are dropped until the count
    /// equals the limit. This is not LRU: access never refreshes an entry.
    fn sweep(&self, now: f64) {
        let mut entries = self.lock_entries();
        entries.retain(|_, entry| now - entry.timestamp < self.ttl_secs);
        Self::enforce_size(&mut entries, self.max_entries);
    }

    fn enforce_size(entries: &mut HashMap<String, CacheEntry>, max_entries: usize) {
        if entries.len() <= max_entries {
            return;
        }
        let mut stamped: Vec<(String, f64)> = entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.timestamp))
            .collect();
        stamped.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let excess = entries.len() - max_entries;
        for (key, _) in stamped.into_iter().take(excess) {
            entries.remove(&key);
        }
    }

    /// Fetch quotes for a symbol batch, serving from cache when fresh.
    ///
    /// An empty batch short-circuits to an empty result with no upstream
    /// call and no limiter interaction, as does a cache hit. On an upstream
    /// failure the cache degrades to stale data for the same key when any
    /// exists (even expired), and to an empty result otherwise; this method
    /// never returns an error.
    pub async fn fetch(&self, symbols: &[String], now: f64) -> Vec<Quote> {
        if symbols.is_empty() {
            return Vec::new();
        }

        let key = Self::cache_key(symbols);

        // Snapshot the entry for this key before the sweep so a failed
        // refresh can still degrade to it after eviction.
        let previous: Option<CacheEntry> = self.lock_entries().get(&key).cloned();
        self.sweep(now);

        if let Some(entry) = &previous {
            if now - entry.timestamp < self.ttl_secs {
                debug!("cache hit for {}", key);
                return entry.quotes.clone();
            }
        }

        self.limiter.acquire().await;
        match self.provider.quotes(symbols).await {
            Ok(quotes) => {
                let mut entries = self.lock_entries();
                entries.insert(
                    key,
                    CacheEntry {
                        quotes: quotes.clone(),
                        timestamp: now,
                    },
                );
                Self::enforce_size(&mut entries, self.max_entries);
                quotes
            }
            Err(err) => {
                // Another task may have repopulated the key during the
                // upstream call; prefer its fresher data over our snapshot.
                let repopulated = self.lock_entries().get(&key).cloned();
                match repopulated.or(previous) {
                    Some(entry) => {
                        // A parse failure means the upstream shape changed;
                        // retrying won't heal it, so escalate the log while
                        // still degrading to the stale data.
                        if err.class() == FailureClass::Parse {
                            error!("unusable quote response for {}, serving stale: {}", key, err);
                        } else {
                            warn!("serving stale quotes for {}: {}", key, err);
                        }
                        entry.quotes
                    }
                    None => {
                        error!("quote fetch failed with no cached fallback for {}: {}", key, err);
                        Vec::new()
                    }
                }
            }
        }
    }

    /// Fetch quotes bypassing the cache in both directions.
    ///
    /// Still limiter-paced, but nothing is read from or written to the
    /// cache and upstream failures propagate. Used by validation paths
    /// where staleness is unacceptable and the caller must distinguish
    /// "symbol unknown" (empty `Ok`) from "could not validate" (`Err`).
    pub async fn fetch_no_cache(&self, symbols: &[String]) -> Result<Vec<Quote>, QuoteError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        self.limiter.acquire().await;
        self.provider.quotes(symbols).await
    }

    /// Drop every cached entry. Idempotent.
    pub fn close(&self) {
        self.lock_entries().clear();
    }

    /// Number of live entries, for diagnostics and tests.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Whether the cache currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
