//! Directed airport pairs.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::AirportCode;
use super::error::DomainError;

/// A directed (origin, destination) airport pair.
///
/// Used as the partition key of the price store. The key form is
/// `ORIGIN-DESTINATION`, e.g. `TSF-VIE`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route {
    pub origin: AirportCode,
    pub destination: AirportCode,
}

impl Route {
    /// Create a route. Origin and destination must differ.
    pub fn new(origin: AirportCode, destination: AirportCode) -> Result<Self, DomainError> {
        if origin == destination {
            return Err(DomainError::CircularRoute(origin));
        }
        Ok(Self {
            origin,
            destination,
        })
    }

    /// The same route flown the other way.
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.destination,
            destination: self.origin,
        }
    }

    /// Parse a store key of the form `TSF-VIE`.
    pub fn parse_key(key: &str) -> Result<Self, DomainError> {
        let (origin, destination) = key
            .split_once('-')
            .ok_or_else(|| DomainError::InvalidRouteKey(key.to_string()))?;

        let origin = AirportCode::parse(origin)
            .map_err(|_| DomainError::InvalidRouteKey(key.to_string()))?;
        let destination = AirportCode::parse(destination)
            .map_err(|_| DomainError::InvalidRouteKey(key.to_string()))?;

        Self::new(origin, destination)
    }

    /// Render the store key.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Route({self})")
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.origin, self.destination)
    }
}

impl TryFrom<String> for Route {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_key(&value)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    #[test]
    fn key_roundtrip() {
        let route = Route::new(code("TSF"), code("VIE")).unwrap();
        assert_eq!(route.key(), "TSF-VIE");
        assert_eq!(Route::parse_key("TSF-VIE").unwrap(), route);
    }

    #[test]
    fn reversed_swaps_endpoints() {
        let route = Route::new(code("TSF"), code("VIE")).unwrap();
        let back = route.reversed();
        assert_eq!(back.origin, code("VIE"));
        assert_eq!(back.destination, code("TSF"));
        assert_eq!(back.reversed(), route);
    }

    #[test]
    fn rejects_circular_route() {
        let err = Route::new(code("VIE"), code("VIE")).unwrap_err();
        assert_eq!(err.to_string(), "route cannot start and end at VIE");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(Route::parse_key("TSFVIE").is_err());
        assert!(Route::parse_key("TSF-vie").is_err());
        assert!(Route::parse_key("TSF-VIE-BGY").is_err());
        assert!(Route::parse_key("VIE-VIE").is_err());
    }
}
