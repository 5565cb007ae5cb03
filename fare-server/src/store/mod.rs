//! Flight price storage.
//!
//! Records are keyed by (route, departure): writing a record for a key that
//! already exists replaces it, so refreshing the same flight twice leaves one
//! record with the newer price.

mod memory;

use std::future::Future;

use chrono::NaiveDateTime;

use crate::domain::{FlightRecord, Route};

pub use memory::MemoryPriceStore;

/// Largest batch a single `batch_write` accepts.
pub const MAX_BATCH_SIZE: usize = 25;

/// Errors from a price store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("batch of {size} records exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Where flight records are persisted.
pub trait PriceStore: Send + Sync {
    /// Write up to [`MAX_BATCH_SIZE`] records, overwriting by key.
    fn batch_write(
        &self,
        records: Vec<FlightRecord>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Records on `route` departing in `[start, end]`, ascending by departure.
    fn query_range(
        &self,
        route: &Route,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> impl Future<Output = Result<Vec<FlightRecord>, StoreError>> + Send;
}
