//! Domain types for the fare server.
//!
//! This module contains the core domain model types that represent
//! validated airfare data. All types enforce their invariants at construction
//! time, so code that receives these types can trust their validity.

mod airport;
mod error;
mod flight;
mod route;
mod trip;

pub use airport::{AirportCode, InvalidAirportCode};
pub use error::DomainError;
pub use flight::FlightRecord;
pub use route::Route;
pub use trip::{Trip, days_between};
