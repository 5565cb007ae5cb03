//! Round-trip queries over stored fares.
//!
//! A query names a set of home airports, a set of destinations, a window of
//! days the traveler can fly in and how long they want to stay. Every
//! outbound leg is paired with every return leg whose stay fits, and the
//! cheapest pairs come back first.

mod config;
mod engine;
mod matcher;
mod rank;
mod request;

pub use config::QueryConfig;
pub use engine::QueryEngine;
pub use matcher::match_legs;
pub use rank::rank_trips;
pub use request::{QueryError, ScanQueryRequest, ValidatedQuery};
