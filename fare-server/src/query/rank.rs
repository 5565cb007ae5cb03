//! Trip ranking for query results.

use crate::domain::Trip;

/// Rank trips by total price, cheapest first, keeping at most `limit`.
///
/// The sort is stable: trips with equal prices keep their match order
/// (departure pair order, then outbound departure, then return departure).
pub fn rank_trips(mut trips: Vec<Trip>, limit: usize) -> Vec<Trip> {
    trips.sort_by(|a, b| a.total_price().total_cmp(&b.total_price()));
    trips.truncate(limit);
    trips
}
