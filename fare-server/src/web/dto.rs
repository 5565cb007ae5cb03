//! Data transfer objects for web requests and responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AirportCode, FlightRecord, Trip};
use crate::graph::Airport;
use crate::query::ScanQueryRequest;

/// Request body for `POST /query`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Shortest stay in days
    pub min_days: i64,

    /// Longest stay in days
    pub max_days: i64,

    /// First travel day, `YYYY-MM-DD` or `YYYYMMDD`
    pub availability_start: String,

    /// Last travel day, `YYYY-MM-DD` or `YYYYMMDD`
    pub availability_end: String,

    /// Home airport codes (case-insensitive)
    pub departure_airports: Vec<String>,

    /// Destination airport codes (case-insensitive)
    pub destination_airports: Vec<String>,

    /// Whether the return must land where the outbound left
    #[serde(default = "default_true")]
    pub return_to_same_airport: bool,

    /// Result ceiling
    pub max_results: Option<usize>,
}

fn default_true() -> bool {
    true
}

/// Parse a travel date in either accepted format.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
}

fn parse_airports(field: &str, codes: &[String]) -> Result<Vec<AirportCode>, String> {
    codes
        .iter()
        .map(|c| AirportCode::parse_normalized(c).map_err(|e| format!("{field}: {e}")))
        .collect()
}

impl QueryRequest {
    /// Convert to a domain request. Fails with a message on malformed
    /// dates or airport codes.
    pub fn into_request(self) -> Result<ScanQueryRequest, String> {
        let availability_start = parse_date(&self.availability_start).ok_or_else(|| {
            format!("availabilityStart: invalid date {:?}", self.availability_start)
        })?;
        let availability_end = parse_date(&self.availability_end)
            .ok_or_else(|| format!("availabilityEnd: invalid date {:?}", self.availability_end))?;

        Ok(ScanQueryRequest {
            min_days: self.min_days,
            max_days: self.max_days,
            availability_start,
            availability_end,
            departure_airports: parse_airports("departureAirports", &self.departure_airports)?,
            destination_airports: parse_airports(
                "destinationAirports",
                &self.destination_airports,
            )?,
            return_to_same_airport: self.return_to_same_airport,
            max_results: self.max_results,
        })
    }
}

/// Response body for `POST /query`.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Cheapest first
    pub trips: Vec<TripResult>,
}

/// A matched round trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripResult {
    pub outbound_legs: Vec<LegResult>,
    pub return_legs: Vec<LegResult>,
    pub total_price: f64,
}

/// One flight in a trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegResult {
    /// Route key, e.g. `TSF-VIE`
    pub route: String,
    pub origin: String,
    pub destination: String,
    /// Local departure time, ISO-8601 without offset
    pub departure_date_time: String,
    /// Local arrival time, ISO-8601 without offset
    pub arrival_date_time: String,
    pub flight_number: String,
    pub price: f64,
    /// When the price was observed (RFC 3339)
    pub updated_at: String,
}

impl LegResult {
    pub fn from_record(record: &FlightRecord) -> Self {
        Self {
            route: record.route.key(),
            origin: record.route.origin.to_string(),
            destination: record.route.destination.to_string(),
            departure_date_time: record.departure.format("%Y-%m-%dT%H:%M:%S").to_string(),
            arrival_date_time: record.arrival.format("%Y-%m-%dT%H:%M:%S").to_string(),
            flight_number: record.flight_number.clone(),
            price: record.price,
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

impl TripResult {
    pub fn from_trip(trip: &Trip) -> Self {
        Self {
            outbound_legs: trip.outbound_legs().iter().map(LegResult::from_record).collect(),
            return_legs: trip.return_legs().iter().map(LegResult::from_record).collect(),
            total_price: trip.total_price(),
        }
    }
}

/// Response body for `GET /airports/{snapshot}`.
#[derive(Debug, Serialize)]
pub struct AirportsResponse {
    pub snapshot: String,
    pub airports: Vec<Airport>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Route;
    use chrono::{TimeZone, Utc};

    fn body(start: &str) -> String {
        format!(
            r#"{{
                "minDays": 2,
                "maxDays": 6,
                "availabilityStart": "{start}",
                "availabilityEnd": "2021-01-10",
                "departureAirports": ["tsf"],
                "destinationAirports": [" VIE "]
            }}"#
        )
    }

    #[test]
    fn parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(parse_date("2021-01-01"), Some(expected));
        assert_eq!(parse_date("20210101"), Some(expected));
        assert_eq!(parse_date("01/01/2021"), None);
        assert_eq!(parse_date("2021-02-30"), None);
    }

    #[test]
    fn request_defaults_and_normalization() {
        let dto: QueryRequest = serde_json::from_str(&body("20210101")).unwrap();
        let request = dto.into_request().unwrap();

        assert!(request.return_to_same_airport);
        assert_eq!(request.max_results, None);
        assert_eq!(request.departure_airports[0].as_str(), "TSF");
        assert_eq!(request.destination_airports[0].as_str(), "VIE");
        assert_eq!(
            request.availability_start,
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
        );
    }

    #[test]
    fn request_rejects_bad_date_and_code() {
        let dto: QueryRequest = serde_json::from_str(&body("yesterday")).unwrap();
        let err = dto.into_request().unwrap_err();
        assert!(err.starts_with("availabilityStart"));

        let dto: QueryRequest = serde_json::from_str(
            r#"{"minDays": 1, "maxDays": 2, "availabilityStart": "2021-01-01",
                "availabilityEnd": "2021-01-02", "departureAirports": ["TS1"],
                "destinationAirports": ["VIE"]}"#,
        )
        .unwrap();
        let err = dto.into_request().unwrap_err();
        assert!(err.starts_with("departureAirports"));
    }

    #[test]
    fn trip_result_shape() {
        let there = Route::parse_key("TSF-VIE").unwrap();
        let dep = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(6, 20, 43)
            .unwrap();
        let updated = Utc.with_ymd_and_hms(2020, 12, 1, 0, 0, 0).unwrap();
        let out = FlightRecord::new(there, dep, dep, "FR 1", 125.0, updated).unwrap();
        let back = FlightRecord::new(there.reversed(), dep, dep, "FR 2", 77.0, updated).unwrap();

        let json = serde_json::to_value(TripResult::from_trip(&Trip::round_trip(out, back))).unwrap();

        assert_eq!(json["totalPrice"], 202.0);
        assert_eq!(json["outboundLegs"][0]["route"], "TSF-VIE");
        assert_eq!(json["outboundLegs"][0]["departureDateTime"], "2021-01-01T06:20:43");
        assert_eq!(json["returnLegs"][0]["origin"], "VIE");
        assert_eq!(json["returnLegs"][0]["flightNumber"], "FR 2");
    }
}
