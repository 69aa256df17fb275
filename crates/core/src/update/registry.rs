//! Per-tenant quote cache registry.
//!
//! Every guild brings its own upstream credential, so every guild gets its
//! own [`QuoteCache`] (and with it its own rate limiter). Both update loops
//! share the same registry so a guild's credential is never paced twice.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;

use tickerdeck_market_data::{CmcProvider, QuoteCache, QuoteProvider};

use crate::config::GuildId;

/// Builds the upstream provider for a credential. Swappable so tests can
/// script the upstream.
type ProviderFactory = Box<dyn Fn(&str) -> Arc<dyn QuoteProvider> + Send + Sync>;

struct TenantCache {
    /// The credential the cache was built for; a changed key rebuilds it.
    api_key: String,
    cache: Arc<QuoteCache>,
}

/// Registry of per-guild quote caches, created on demand.
pub struct CacheRegistry {
    caches: Mutex<HashMap<GuildId, TenantCache>>,
    factory: ProviderFactory,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::with_provider_factory(Box::new(|api_key| {
            Arc::new(CmcProvider::new(api_key.to_string()))
        }))
    }

    /// A registry that builds providers through the given factory.
    pub fn with_provider_factory(factory: ProviderFactory) -> Self {
        Self {
            caches: Mutex::new(HashMap::new()),
            factory,
        }
    }

    /// Lock the cache map, recovering from poison if necessary.
    fn lock_caches(&self) -> MutexGuard<'_, HashMap<GuildId, TenantCache>> {
        self.caches.lock().unwrap_or_else(|poisoned| {
            warn!("cache registry mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// The cache for a guild, building one if absent or if the guild's
    /// API key changed since the cache was built.
    pub fn for_guild(&self, guild: GuildId, api_key: &str) -> Arc<QuoteCache> {
        let mut caches = self.lock_caches();
        if let Some(tenant) = caches.get(&guild) {
            if tenant.api_key == api_key {
                return tenant.cache.clone();
            }
        }
        let cache = Arc::new(QuoteCache::new((self.factory)(api_key)));
        caches.insert(
            guild,
            TenantCache {
                api_key: api_key.to_string(),
                cache: cache.clone(),
            },
        );
        cache
    }

    /// Drop a guild's cache, e.g. when the guild is deconfigured.
    pub fn remove(&self, guild: GuildId) {
        if let Some(tenant) = self.lock_caches().remove(&guild) {
            tenant.cache.close();
        }
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_reuses_cache() {
        let registry = CacheRegistry::new();
        let first = registry.for_guild(1, "key-a");
        let second = registry.for_guild(1, "key-a");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_changed_key_rebuilds_cache() {
        let registry = CacheRegistry::new();
        let first = registry.for_guild(1, "key-a");
        let second = registry.for_guild(1, "key-b");
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_guilds_are_isolated() {
        let registry = CacheRegistry::new();
        let a = registry.for_guild(1, "key");
        let b = registry.for_guild(2, "key");
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
