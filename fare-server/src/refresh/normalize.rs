//! Currency normalization.
//!
//! Two passes: collect the distinct currencies across every fetched leg and
//! resolve one factor each, then rescale. A run with thousands of legs in
//! three currencies costs three lookups.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::currency::CurrencyResolver;
use crate::domain::{FlightRecord, Route};
use crate::fares::FareLeg;

/// A fetched leg still priced in its source currency.
#[derive(Debug, Clone)]
pub struct PendingLeg {
    pub route: Route,
    /// Lowercased.
    pub currency: String,
    pub leg: FareLeg,
}

/// Legs after normalization.
#[derive(Debug, Default)]
pub struct Normalized {
    pub records: Vec<FlightRecord>,
    pub dropped: usize,
}

/// Resolve a factor from every currency in `legs` to `base`.
///
/// Currencies that cannot be resolved are logged and left out.
pub async fn resolve_factors<C: CurrencyResolver>(
    resolver: &C,
    legs: &[PendingLeg],
    base: &str,
) -> HashMap<String, f64> {
    let currencies: BTreeSet<&str> = legs.iter().map(|l| l.currency.as_str()).collect();

    let mut factors = HashMap::with_capacity(currencies.len());
    for currency in currencies {
        if currency == base {
            factors.insert(currency.to_string(), 1.0);
            continue;
        }
        match resolver.get_conversion_factor(currency, base).await {
            Ok(factor) => {
                tracing::debug!(currency, base, factor, "resolved conversion factor");
                factors.insert(currency.to_string(), factor);
            }
            Err(e) => {
                tracing::error!(currency, base, error = %e, "cannot resolve conversion factor");
            }
        }
    }
    factors
}

/// Rescale legs into base-currency flight records.
///
/// Records are stamped `updated_at = now` and expire at their departure.
/// Legs in an unresolved currency, or that fail record validation, are
/// dropped.
pub fn apply_factors(
    legs: Vec<PendingLeg>,
    factors: &HashMap<String, f64>,
    now: DateTime<Utc>,
) -> Normalized {
    let mut out = Normalized::default();

    for pending in legs {
        let Some(factor) = factors.get(&pending.currency) else {
            out.dropped += 1;
            continue;
        };

        let leg = pending.leg;
        let departure = leg.departure;
        match FlightRecord::new(
            pending.route,
            departure,
            leg.arrival,
            leg.flight_number,
            leg.price * factor,
            now,
        ) {
            Ok(record) => out.records.push(record.with_expiry(departure.and_utc())),
            Err(e) => {
                tracing::warn!(route = %pending.route, error = %e, "dropping invalid leg");
                out.dropped += 1;
            }
        }
    }

    if out.dropped > 0 {
        tracing::warn!(dropped = out.dropped, "legs dropped during normalization");
    }
    out
}
