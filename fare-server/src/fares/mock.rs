//! Scripted fare source for tests.
//!
//! Responses are configured per route; unscripted routes answer
//! `RouteUnavailable`, like a real source for a route it does not fly.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::domain::{AirportCode, Route};

use super::FareSource;
use super::error::FareSourceError;
use super::types::FareQuote;

/// A scripted answer.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Quote(FareQuote),
    RouteUnavailable,
    MalformedRequest,
    ServerError,
}

impl MockResponse {
    fn to_result(&self) -> Result<FareQuote, FareSourceError> {
        match self {
            MockResponse::Quote(quote) => Ok(quote.clone()),
            MockResponse::RouteUnavailable => Err(FareSourceError::RouteUnavailable),
            MockResponse::MalformedRequest => Err(FareSourceError::MalformedRequest {
                status: 400,
                message: "mock malformed request".to_string(),
            }),
            MockResponse::ServerError => Err(FareSourceError::Api {
                status: 500,
                message: "mock server error".to_string(),
            }),
        }
    }
}

/// Fare source that answers from a per-route script and records every call.
#[derive(Debug)]
pub struct MockFareSource {
    name: String,
    responses: HashMap<Route, MockResponse>,
    fallback: MockResponse,
    calls: Mutex<Vec<(Route, NaiveDate)>>,
}

impl MockFareSource {
    /// Create a mock with no scripted routes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: HashMap::new(),
            fallback: MockResponse::RouteUnavailable,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script the answer for one route.
    pub fn with_response(mut self, route: Route, response: MockResponse) -> Self {
        self.responses.insert(route, response);
        self
    }

    /// Answer for routes without a script.
    pub fn with_fallback(mut self, response: MockResponse) -> Self {
        self.fallback = response;
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<(Route, NaiveDate)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

impl FareSource for MockFareSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_flights(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        date: NaiveDate,
    ) -> Result<FareQuote, FareSourceError> {
        let route = Route::new(*origin, *destination).map_err(|e| {
            FareSourceError::MalformedRequest {
                status: 400,
                message: e.to_string(),
            }
        })?;

        if let Ok(mut calls) = self.calls.lock() {
            calls.push((route, date));
        }

        self.responses
            .get(&route)
            .unwrap_or(&self.fallback)
            .to_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fares::FareLeg;

    fn route(o: &str, d: &str) -> Route {
        Route::new(AirportCode::parse(o).unwrap(), AirportCode::parse(d).unwrap()).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn scripted_and_fallback_answers() {
        let quote = FareQuote {
            currency: "eur".into(),
            legs: vec![FareLeg {
                departure: date().and_hms_opt(6, 0, 0).unwrap(),
                arrival: date().and_hms_opt(7, 0, 0).unwrap(),
                flight_number: "FR 1".into(),
                price: 19.99,
            }],
        };
        let tsf_vie = route("TSF", "VIE");
        let mock = MockFareSource::new("mock")
            .with_response(tsf_vie, MockResponse::Quote(quote.clone()));

        let got = mock
            .get_flights(&tsf_vie.origin, &tsf_vie.destination, date())
            .await
            .unwrap();
        assert_eq!(got, quote);

        let vie_tsf = tsf_vie.reversed();
        let err = mock
            .get_flights(&vie_tsf.origin, &vie_tsf.destination, date())
            .await
            .unwrap_err();
        assert!(matches!(err, FareSourceError::RouteUnavailable));

        assert_eq!(mock.calls(), vec![(tsf_vie, date()), (vie_tsf, date())]);
    }

    #[tokio::test]
    async fn malformed_response_is_fatal() {
        let mock = MockFareSource::new("mock").with_fallback(MockResponse::MalformedRequest);
        let r = route("TSF", "VIE");
        let err = mock.get_flights(&r.origin, &r.destination, date()).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(mock.call_count(), 1);
    }
}
