//! Batched persistence.

use crate::domain::FlightRecord;
use crate::store::{MAX_BATCH_SIZE, PriceStore};

/// Outcome of persisting a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub written: usize,
    pub failed_chunks: usize,
    pub failed_records: usize,
}

/// Split records into contiguous chunks of at most `size`, in order.
///
/// `size` is clamped to `1..=MAX_BATCH_SIZE`.
pub fn chunk_records(records: Vec<FlightRecord>, size: usize) -> Vec<Vec<FlightRecord>> {
    let size = size.clamp(1, MAX_BATCH_SIZE);
    let mut chunks = Vec::with_capacity(records.len().div_ceil(size));
    let mut iter = records.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}

/// Write every chunk, one after another.
///
/// A failed chunk is logged and counted; later chunks are still written.
pub async fn write_in_chunks<P: PriceStore>(
    store: &P,
    records: Vec<FlightRecord>,
    size: usize,
) -> WriteOutcome {
    let mut outcome = WriteOutcome::default();

    for (index, chunk) in chunk_records(records, size).into_iter().enumerate() {
        let len = chunk.len();
        match store.batch_write(chunk).await {
            Ok(()) => outcome.written += len,
            Err(e) => {
                tracing::error!(chunk = index, records = len, error = %e, "batch write failed");
                outcome.failed_chunks += 1;
                outcome.failed_records += len;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AirportCode, Route};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn records(n: usize) -> Vec<FlightRecord> {
        let route = Route::new(AirportCode::parse("TSF").unwrap(), AirportCode::parse("VIE").unwrap())
            .unwrap();
        let base = NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let updated = Utc.with_ymd_and_hms(2029, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let dep = base + chrono::Duration::hours(i as i64);
                FlightRecord::new(route, dep, dep, format!("FR {i}"), i as f64, updated).unwrap()
            })
            .collect()
    }

    #[test]
    fn chunks_are_contiguous() {
        let chunks = chunk_records(records(57), 25);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![25, 25, 7]);

        // Order is preserved across chunk boundaries
        let numbers: Vec<String> = chunks
            .iter()
            .flatten()
            .map(|r| r.flight_number.clone())
            .collect();
        let expected: Vec<String> = (0..57).map(|i| format!("FR {i}")).collect();
        assert_eq!(numbers, expected);
    }

    #[test]
    fn empty_input_has_no_chunks() {
        assert!(chunk_records(Vec::new(), 25).is_empty());
    }

    #[test]
    fn size_is_clamped() {
        let sizes: Vec<usize> = chunk_records(records(30), 100).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![25, 5]);

        let sizes: Vec<usize> = chunk_records(records(2), 0).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 1]);
    }
}
