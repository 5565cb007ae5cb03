//! Caching layer for currency conversion factors.
//!
//! A refresh run asks for the same handful of currency pairs every time, and
//! rates move slowly, so factors are cached with a TTL. Failed lookups are
//! not cached.

use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::currency::{CurrencyError, CurrencyResolver};

/// Cache key: (from, to), both lowercased.
type RateKey = (String, String);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 1000,
        }
    }
}

/// Currency resolver with caching.
///
/// Wraps any resolver and caches the factors it returns.
pub struct CachedCurrencyResolver<C: CurrencyResolver> {
    inner: C,
    rates: MokaCache<RateKey, f64>,
}

impl<C: CurrencyResolver> CachedCurrencyResolver<C> {
    /// Create a new cached resolver.
    pub fn new(inner: C, config: &CacheConfig) -> Self {
        let rates = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, rates }
    }
}

impl<C: CurrencyResolver> CurrencyResolver for CachedCurrencyResolver<C> {
    async fn get_conversion_factor(&self, from: &str, to: &str) -> Result<f64, CurrencyError> {
        let key = (from.to_ascii_lowercase(), to.to_ascii_lowercase());

        if let Some(rate) = self.rates.get(&key).await {
            return Ok(rate);
        }

        let rate = self.inner.get_conversion_factor(&key.0, &key.1).await?;
        tracing::debug!(from = %key.0, to = %key.1, rate, "cached conversion factor");
        self.rates.insert(key, rate).await;
        Ok(rate)
    }
}
