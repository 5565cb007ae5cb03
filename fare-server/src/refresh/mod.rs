//! Price refresh engine.
//!
//! A run samples (route, day) pairs from each source's connectivity graph,
//! asks the source for fares, converts every price to the base currency and
//! writes the records to the price store in small batches.
//!
//! The only rate control toward a source is its per-run request cap and the
//! client's own concurrency limit. Runs do not coordinate with each other, so
//! overlapping runs multiply the load on a source.

mod batch;
mod config;
mod engine;
mod normalize;
mod report;

pub use batch::{WriteOutcome, chunk_records, write_in_chunks};
pub use config::{DEFAULT_BASE_CURRENCY, RefreshConfig, SourceEntry};
pub use engine::RefreshEngine;
pub use normalize::{Normalized, PendingLeg, apply_factors, resolve_factors};
pub use report::{RefreshReport, SourceReport, StopReason};
