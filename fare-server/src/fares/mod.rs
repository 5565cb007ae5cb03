//! Live airfare sources.
//!
//! A fare source answers "which flights go from A to B on this day, and what
//! do they cost". Prices come in whatever currency the source quotes; the
//! refresh engine normalizes them before storing.

mod client;
mod error;
#[cfg(test)]
pub mod mock;
mod types;

use std::future::Future;

use chrono::NaiveDate;

use crate::domain::AirportCode;

pub use client::{FareSourceConfig, HttpFareSource};
pub use error::FareSourceError;
pub use types::{AirportDto, ConversionError, FareLeg, FareQuote, FareResponse, FlightDto};

/// A source of live fares.
pub trait FareSource: Send + Sync {
    /// Name used in logs and metric names.
    fn name(&self) -> &str;

    /// All priced flights for `origin -> destination` departing on `date`.
    fn get_flights(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        date: NaiveDate,
    ) -> impl Future<Output = Result<FareQuote, FareSourceError>> + Send;
}
