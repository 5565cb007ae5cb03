//! Cross-matching outbound and return legs.

use crate::domain::{FlightRecord, Trip, days_between};

/// Pair every outbound leg with every return leg whose stay lies in
/// `[min_days, max_days]`.
///
/// `returns` must be sorted ascending by departure: once a return is too far
/// out, every later one is too, so the scan for that outbound stops there.
/// Returns that are too early are skipped, since a later one may still fit.
pub fn match_legs(
    outbound: &[FlightRecord],
    returns: &[FlightRecord],
    min_days: i64,
    max_days: i64,
) -> Vec<Trip> {
    debug_assert!(
        returns.is_sorted_by_key(|r| r.departure),
        "return legs must be sorted by departure"
    );

    let mut trips = Vec::new();
    for out in outbound {
        for back in returns {
            let duration = days_between(out, back);
            if duration < min_days {
                continue;
            }
            if duration > max_days {
                break;
            }
            trips.push(Trip::round_trip(out.clone(), back.clone()));
        }
    }
    trips
}
