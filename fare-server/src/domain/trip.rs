//! Matched round trips.

use super::FlightRecord;

/// Whole days between two departures.
///
/// Uses the full timestamp difference truncated toward zero, so a return
/// 2 days and 23 hours after the outbound counts as 2 days.
pub fn days_between(outbound: &FlightRecord, inbound: &FlightRecord) -> i64 {
    (inbound.departure - outbound.departure).num_days()
}

/// A round trip: outbound leg(s), return leg(s) and the combined price.
///
/// The matcher only produces one leg per direction; the lists leave room
/// for connecting itineraries.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    outbound_legs: Vec<FlightRecord>,
    return_legs: Vec<FlightRecord>,
    total_price: f64,
}

impl Trip {
    /// A trip made of one outbound and one return leg.
    ///
    /// The total is the exact sum of the two prices.
    pub fn round_trip(outbound: FlightRecord, inbound: FlightRecord) -> Self {
        let total_price = outbound.price + inbound.price;
        Self {
            outbound_legs: vec![outbound],
            return_legs: vec![inbound],
            total_price,
        }
    }

    pub fn outbound_legs(&self) -> &[FlightRecord] {
        &self.outbound_legs
    }

    pub fn return_legs(&self) -> &[FlightRecord] {
        &self.return_legs
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    /// Days between the first outbound departure and the first return departure.
    pub fn duration_days(&self) -> i64 {
        match (self.outbound_legs.first(), self.return_legs.first()) {
            (Some(out), Some(back)) => days_between(out, back),
            _ => 0,
        }
    }
}
