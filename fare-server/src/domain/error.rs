//! Domain error types.
//!
//! These errors represent validation failures in the domain layer.
//! They are distinct from API/IO errors.

use super::AirportCode;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A route whose origin and destination are the same airport
    #[error("route cannot start and end at {0}")]
    CircularRoute(AirportCode),

    /// A store key that is not of the form `AAA-BBB`
    #[error("invalid route key: {0:?}")]
    InvalidRouteKey(String),

    /// A price that is negative or not a number
    #[error("invalid price {0}")]
    InvalidPrice(f64),
}
