//! Trip query requests and their validation.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::AirportCode;
use crate::graph::GraphError;
use crate::store::StoreError;

use super::config::QueryConfig;

/// Errors from a trip query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The request itself is invalid; nothing was read
    #[error("invalid query: {0}")]
    Validation(String),

    /// Connectivity snapshot could not be loaded
    #[error("connectivity error: {0}")]
    Graph(#[from] GraphError),

    /// Price store read failed
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Find round trips from any departure airport to any destination airport.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanQueryRequest {
    /// Shortest stay, in whole days
    pub min_days: i64,
    /// Longest stay, in whole days
    pub max_days: i64,
    /// First day the traveler can fly (inclusive)
    pub availability_start: NaiveDate,
    /// Last day the traveler can fly (inclusive)
    pub availability_end: NaiveDate,
    pub departure_airports: Vec<AirportCode>,
    pub destination_airports: Vec<AirportCode>,
    /// When false, the return may land at any of the departure airports
    pub return_to_same_airport: bool,
    /// Result ceiling; the configured default when `None`
    pub max_results: Option<usize>,
}

/// A request that passed validation, with sets deduplicated and the window
/// expanded to timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    pub min_days: i64,
    pub max_days: i64,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub departures: BTreeSet<AirportCode>,
    pub destinations: BTreeSet<AirportCode>,
    pub return_to_same_airport: bool,
    pub max_results: usize,
}

impl ScanQueryRequest {
    /// Check the request shape. Touches no store.
    pub fn validate(&self, config: &QueryConfig) -> Result<ValidatedQuery, QueryError> {
        if self.min_days < 0 {
            return Err(QueryError::Validation(format!(
                "minDays must not be negative (got {})",
                self.min_days
            )));
        }
        if self.min_days > self.max_days {
            return Err(QueryError::Validation(format!(
                "minDays ({}) is greater than maxDays ({})",
                self.min_days, self.max_days
            )));
        }
        if self.departure_airports.is_empty() {
            return Err(QueryError::Validation(
                "departureAirports must not be empty".to_string(),
            ));
        }
        if self.destination_airports.is_empty() {
            return Err(QueryError::Validation(
                "destinationAirports must not be empty".to_string(),
            ));
        }
        if self.availability_end < self.availability_start {
            return Err(QueryError::Validation(format!(
                "availabilityEnd ({}) is before availabilityStart ({})",
                self.availability_end, self.availability_start
            )));
        }

        let max_results = self.max_results.unwrap_or(config.default_max_results);
        if max_results == 0 {
            return Err(QueryError::Validation(
                "maxResults must be at least 1".to_string(),
            ));
        }
        if max_results > config.max_results_limit {
            return Err(QueryError::Validation(format!(
                "maxResults must be at most {}",
                config.max_results_limit
            )));
        }

        Ok(ValidatedQuery {
            min_days: self.min_days,
            max_days: self.max_days,
            window_start: self.availability_start.and_time(NaiveTime::MIN),
            window_end: end_of_day(self.availability_end),
            departures: self.departure_airports.iter().copied().collect(),
            destinations: self.destination_airports.iter().copied().collect(),
            return_to_same_airport: self.return_to_same_airport,
            max_results,
        })
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.succ_opt()
        .map(|next| next.and_time(NaiveTime::MIN) - chrono::Duration::nanoseconds(1))
        .unwrap_or(NaiveDateTime::MAX)
}
