//! Counters emitted by the refresh engine.
//!
//! Emission is best effort: callers log and ignore failures.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

/// Errors emitting a metric.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("metrics sink unavailable: {0}")]
    Unavailable(String),
}

/// Receives named counts.
pub trait MetricsSink: Send + Sync {
    fn record_count(
        &self,
        name: &str,
        value: u64,
    ) -> impl Future<Output = Result<(), MetricsError>> + Send;
}

/// Emits every count as a structured `tracing` event.
#[derive(Debug, Clone, Default)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    async fn record_count(&self, name: &str, value: u64) -> Result<(), MetricsError> {
        tracing::info!(metric = name, value, "count");
        Ok(())
    }
}

/// Keeps running totals in memory.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counts: Mutex<HashMap<String, u64>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total recorded under `name`.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.counts
            .lock()
            .ok()
            .and_then(|counts| counts.get(name).copied())
    }

    /// All totals, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut all: Vec<(String, u64)> = self
            .counts
            .lock()
            .map(|counts| counts.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();
        all.sort();
        all
    }
}

impl MetricsSink for InMemoryMetrics {
    async fn record_count(&self, name: &str, value: u64) -> Result<(), MetricsError> {
        let mut counts = self
            .counts
            .lock()
            .map_err(|e| MetricsError::Unavailable(e.to_string()))?;
        *counts.entry(name.to_string()).or_insert(0) += value;
        Ok(())
    }
}
