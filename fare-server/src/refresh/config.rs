//! Refresh configuration.

use crate::sampling::SamplingConfig;
use crate::store::MAX_BATCH_SIZE;

/// Default base currency; every stored price is in this currency.
pub const DEFAULT_BASE_CURRENCY: &str = "eur";

/// Configuration for a price refresh run.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Records per store write
    pub batch_size: usize,

    /// Currency prices are normalized to, lowercased
    pub base_currency: String,

    /// Date sampling parameters
    pub sampling: SamplingConfig,
}

impl RefreshConfig {
    /// Set the base currency.
    pub fn with_base_currency(mut self, currency: &str) -> Self {
        self.base_currency = currency.trim().to_ascii_lowercase();
        self
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            sampling: SamplingConfig::default(),
        }
    }
}

/// A fare source to refresh, with its connectivity snapshot and request cap.
#[derive(Debug, Clone)]
pub struct SourceEntry<S> {
    pub source: S,
    /// Name of the connectivity snapshot routes are sampled from
    pub snapshot: String,
    /// Upper bound on fare lookups per run
    pub max_requests: usize,
}

impl<S> SourceEntry<S> {
    pub fn new(source: S, snapshot: impl Into<String>, max_requests: usize) -> Self {
        Self {
            source,
            snapshot: snapshot.into(),
            max_requests,
        }
    }
}
