//! Stored flight legs.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Route;
use super::error::DomainError;

/// A single priced flight on a route, as kept in the price store.
///
/// `(route, departure)` identifies the record: writing a record with the
/// same key replaces the previous one. Prices are in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub route: Route,
    /// Scheduled departure, local to the origin airport.
    pub departure: NaiveDateTime,
    /// Scheduled arrival, local to the destination airport.
    pub arrival: NaiveDateTime,
    pub flight_number: String,
    pub price: f64,
    /// When this price was observed.
    pub updated_at: DateTime<Utc>,
    /// After this instant the store no longer returns the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl FlightRecord {
    /// Create a record without an expiry marker.
    ///
    /// Departure and arrival are local to different airports, so a short
    /// westbound hop can arrive "before" it leaves; their order is not checked.
    pub fn new(
        route: Route,
        departure: NaiveDateTime,
        arrival: NaiveDateTime,
        flight_number: impl Into<String>,
        price: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !price.is_finite() || price < 0.0 {
            return Err(DomainError::InvalidPrice(price));
        }

        Ok(Self {
            route,
            departure,
            arrival,
            flight_number: flight_number.into(),
            price,
            updated_at,
            expires_at: None,
        })
    }

    /// Set the expiry marker.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the record has aged out at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
