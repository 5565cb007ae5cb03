//! The price refresh run.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rand::Rng;

use crate::currency::CurrencyResolver;
use crate::fares::{FareSource, FareSourceError};
use crate::graph::{ConnectivityGraph, GraphStore};
use crate::metrics::MetricsSink;
use crate::sampling::{pick_random_route, pick_weighted_offset};
use crate::store::PriceStore;

use super::batch::write_in_chunks;
use super::config::{RefreshConfig, SourceEntry};
use super::normalize::{PendingLeg, apply_factors, resolve_factors};
use super::report::{RefreshReport, SourceReport, StopReason};

/// Refreshes stored prices from a set of fare sources.
///
/// Holds borrowed collaborators; build one per run.
pub struct RefreshEngine<'a, S, C, P, M, G>
where
    S: FareSource,
    C: CurrencyResolver,
    P: PriceStore,
    M: MetricsSink,
    G: GraphStore,
{
    sources: &'a [SourceEntry<S>],
    currency: &'a C,
    store: &'a P,
    metrics: &'a M,
    graphs: &'a G,
    config: &'a RefreshConfig,
}

impl<'a, S, C, P, M, G> RefreshEngine<'a, S, C, P, M, G>
where
    S: FareSource,
    C: CurrencyResolver,
    P: PriceStore,
    M: MetricsSink,
    G: GraphStore,
{
    pub fn new(
        sources: &'a [SourceEntry<S>],
        currency: &'a C,
        store: &'a P,
        metrics: &'a M,
        graphs: &'a G,
        config: &'a RefreshConfig,
    ) -> Self {
        Self {
            sources,
            currency,
            store,
            metrics,
            graphs,
            config,
        }
    }

    /// Run one refresh: sample and fetch from every source, normalize, persist.
    ///
    /// Dates are offsets from `today`; records are stamped with `now`.
    /// Never fails as a whole: per-source and per-chunk failures are logged
    /// and reported.
    pub async fn refresh_prices<R: Rng + Send>(
        &self,
        rng: &mut R,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> RefreshReport {
        let mut report = RefreshReport::default();
        let mut pending: Vec<PendingLeg> = Vec::new();

        for entry in self.sources {
            let source_report = self.refresh_source(entry, rng, today, &mut pending).await;
            self.emit_metric(&source_report).await;
            report.sources.push(source_report);
        }

        let factors = resolve_factors(self.currency, &pending, &self.config.base_currency).await;
        let normalized = apply_factors(pending, &factors, now);
        report.dropped_legs = normalized.dropped;

        let outcome = write_in_chunks(self.store, normalized.records, self.config.batch_size).await;
        report.records_written = outcome.written;
        report.failed_chunks = outcome.failed_chunks;

        tracing::info!(
            sources = report.sources.len(),
            written = report.records_written,
            failed_chunks = report.failed_chunks,
            dropped = report.dropped_legs,
            "price refresh finished"
        );
        report
    }

    async fn refresh_source<R: Rng + Send>(
        &self,
        entry: &SourceEntry<S>,
        rng: &mut R,
        today: NaiveDate,
        pending: &mut Vec<PendingLeg>,
    ) -> SourceReport {
        let name = entry.source.name();
        let mut report = SourceReport::new(name);

        let graph = match ConnectivityGraph::load(self.graphs, &entry.snapshot).await {
            Ok(graph) => graph,
            Err(e) => {
                tracing::error!(source = name, snapshot = %entry.snapshot, error = %e, "skipping source: no connectivity graph");
                report.stop = Some(StopReason::GraphUnavailable);
                return report;
            }
        };

        let sampling = &self.config.sampling;
        for _ in 0..entry.max_requests {
            let route = match pick_random_route(rng, &graph) {
                Ok(route) => route,
                Err(e) => {
                    tracing::warn!(source = name, error = %e, "nothing to sample");
                    report.stop = Some(StopReason::NoRoutes);
                    break;
                }
            };
            let offset = match pick_weighted_offset(
                rng,
                sampling.lower_bound,
                sampling.horizon_days,
                sampling.decay,
            ) {
                Ok(offset) => offset,
                Err(e) => {
                    tracing::error!(source = name, error = %e, "invalid sampling settings");
                    report.stop = Some(StopReason::InvalidSampling);
                    break;
                }
            };
            let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
                report.stop = Some(StopReason::InvalidSampling);
                break;
            };

            report.attempts += 1;
            match entry
                .source
                .get_flights(&route.origin, &route.destination, date)
                .await
            {
                Ok(quote) => {
                    report.successes += 1;
                    report.legs += quote.legs.len();
                    let currency = quote.currency.to_ascii_lowercase();
                    pending.extend(quote.legs.into_iter().map(|leg| PendingLeg {
                        route,
                        currency: currency.clone(),
                        leg,
                    }));
                }
                Err(FareSourceError::RouteUnavailable) => {
                    tracing::warn!(source = name, %route, %date, "route not available");
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(source = name, %route, %date, error = %e, "source rejected request, stopping");
                    report.stop = Some(StopReason::MalformedRequest);
                    break;
                }
                Err(e) => {
                    tracing::error!(source = name, %route, %date, error = %e, "fare lookup failed");
                }
            }
        }

        tracing::info!(
            source = name,
            attempts = report.attempts,
            successes = report.successes,
            legs = report.legs,
            "source refreshed"
        );
        report
    }

    async fn emit_metric(&self, report: &SourceReport) {
        let metric = format!("{}_api_calls", report.name);
        if let Err(e) = self.metrics.record_count(&metric, report.successes).await {
            tracing::warn!(metric = %metric, error = %e, "failed to emit metric");
        }
    }
}
