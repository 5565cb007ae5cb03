//! Fare source wire types and their conversion to fare quotes.
//!
//! The wire types mirror the JSON the fare API sends. Timestamps arrive as
//! local ISO-8601 strings without an offset (`2021-01-01T06:20:43`), which is
//! how airlines publish schedules: in the local time of each airport.

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::domain::AirportCode;
use crate::graph::AirportInfo;

/// One priced flight as returned by a fare source.
#[derive(Debug, Clone, PartialEq)]
pub struct FareLeg {
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub flight_number: String,
    /// In the quote's currency.
    pub price: f64,
}

/// The flights a source offers for one route and day, all priced in `currency`.
#[derive(Debug, Clone, PartialEq)]
pub struct FareQuote {
    pub currency: String,
    pub legs: Vec<FareLeg>,
}

/// Response from `GET /fares/{origin}/{destination}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareResponse {
    pub currency: String,
    #[serde(default)]
    pub flights: Vec<FlightDto>,
}

/// A single flight in a fare response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDto {
    pub departure_date_time: String,
    pub arrival_date_time: String,
    pub flight_number: String,
    /// Absent when the flight is sold out.
    pub price: Option<f64>,
}

/// An entry in `GET /airports`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportDto {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub country_code: String,
}

/// Errors converting wire types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("empty currency code")]
    MissingCurrency,
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, ConversionError> {
    s.parse::<NaiveDateTime>()
        .map_err(|_| ConversionError::InvalidTimestamp(s.to_string()))
}

impl FareResponse {
    /// Convert to a quote.
    ///
    /// Sold-out flights (no price) and flights with a negative or non-finite
    /// price are skipped. A bad timestamp fails the whole response.
    pub fn into_quote(self) -> Result<FareQuote, ConversionError> {
        let currency = self.currency.trim().to_ascii_lowercase();
        if currency.is_empty() {
            return Err(ConversionError::MissingCurrency);
        }

        let mut legs = Vec::with_capacity(self.flights.len());
        for flight in self.flights {
            let Some(price) = flight.price.filter(|p| p.is_finite() && *p >= 0.0) else {
                tracing::debug!(flight = %flight.flight_number, "skipping unpriced flight");
                continue;
            };
            legs.push(FareLeg {
                departure: parse_timestamp(&flight.departure_date_time)?,
                arrival: parse_timestamp(&flight.arrival_date_time)?,
                flight_number: flight.flight_number,
                price,
            });
        }

        Ok(FareQuote { currency, legs })
    }
}

impl AirportDto {
    /// Convert to an airport listing entry; `None` for an invalid code.
    pub fn into_info(self) -> Option<AirportInfo> {
        match AirportCode::parse(&self.code) {
            Ok(code) => Some(AirportInfo {
                code,
                name: self.name,
                country_code: self.country_code,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "skipping airport with invalid code");
                None
            }
        }
    }
}
