//! Airport connectivity snapshots.
//!
//! A snapshot lists, per airport, which airports a fare source flies to from
//! there. The refresh engine samples routes from it and the query engine uses
//! it to skip store lookups for routes that do not exist.
//!
//! Snapshots are immutable once loaded; the connectivity refresh builds a new
//! one with [`ConnectivityGraph::upsert`] and stores it whole.

mod error;
mod refresh;
mod store;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::AirportCode;

pub use error::GraphError;
pub use refresh::{AirportDirectory, AirportInfo, ConnectivityRefresher, DirectoryError};
pub use store::{FileGraphStore, GraphStore, MemoryGraphStore};

static NO_CONNECTIONS: BTreeSet<AirportCode> = BTreeSet::new();

/// One airport and the airports reachable from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub airport_code: AirportCode,
    pub name: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub connections: BTreeSet<AirportCode>,
    /// `None` for airports that were discovered but never refreshed.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Airport {
    /// An airport known only by name, with no connections yet.
    pub fn placeholder(code: AirportCode, name: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            airport_code: code,
            name: name.into(),
            country_code: country_code.into(),
            connections: BTreeSet::new(),
            last_updated: None,
        }
    }
}

/// Serialized form of a snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDocument {
    airports: Vec<Airport>,
}

/// Which airports are reachable from which.
///
/// Airports are kept ordered by code, so iteration (and therefore seeded
/// route sampling) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectivityGraph {
    airports: BTreeMap<AirportCode, Airport>,
}

impl ConnectivityGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a list of airports.
    ///
    /// Later duplicates replace earlier ones. Connections to airports that are
    /// not in the list, and self-connections, are dropped.
    pub fn from_airports(airports: impl IntoIterator<Item = Airport>) -> Self {
        let mut map: BTreeMap<AirportCode, Airport> = BTreeMap::new();
        for airport in airports {
            map.insert(airport.airport_code, airport);
        }

        let known: BTreeSet<AirportCode> = map.keys().copied().collect();
        for airport in map.values_mut() {
            let code = airport.airport_code;
            let before = airport.connections.len();
            airport.connections.retain(|c| *c != code && known.contains(c));
            let dropped = before - airport.connections.len();
            if dropped > 0 {
                tracing::warn!(
                    airport = %code,
                    dropped,
                    "dropped connections to airports missing from snapshot"
                );
            }
        }

        Self { airports: map }
    }

    /// Decode a snapshot document.
    pub fn from_json(name: &str, json: &str) -> Result<Self, GraphError> {
        let doc: SnapshotDocument = serde_json::from_str(json).map_err(|e| GraphError::Corrupt {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_airports(doc.airports))
    }

    /// Encode as a snapshot document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let doc = SnapshotDocument {
            airports: self.airports.values().cloned().collect(),
        };
        serde_json::to_string_pretty(&doc)
    }

    /// Fetch the named snapshot from a store.
    pub async fn load<G: GraphStore>(store: &G, name: &str) -> Result<Self, GraphError> {
        let graph = store.get_snapshot(name).await?;
        tracing::debug!(
            snapshot = name,
            airports = graph.len(),
            edges = graph.edge_count(),
            "loaded connectivity snapshot"
        );
        Ok(graph)
    }

    /// Airports reachable from `code`. Empty for unknown airports.
    pub fn connections_of(&self, code: &AirportCode) -> &BTreeSet<AirportCode> {
        self.airports
            .get(code)
            .map(|a| &a.connections)
            .unwrap_or(&NO_CONNECTIONS)
    }

    /// Whether the graph has a direct edge `origin -> destination`.
    pub fn serves(&self, origin: &AirportCode, destination: &AirportCode) -> bool {
        self.connections_of(origin).contains(destination)
    }

    /// Look up an airport.
    pub fn get(&self, code: &AirportCode) -> Option<&Airport> {
        self.airports.get(code)
    }

    /// Whether the airport is in the graph.
    pub fn contains(&self, code: &AirportCode) -> bool {
        self.airports.contains_key(code)
    }

    /// Airports in code order.
    pub fn airports(&self) -> impl Iterator<Item = &Airport> {
        self.airports.values()
    }

    /// Number of airports.
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    /// Whether the graph has no airports.
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.airports.values().map(|a| a.connections.len()).sum()
    }

    /// The candidate refreshed longest ago.
    ///
    /// Never-refreshed airports come first. Ties go to the earliest candidate
    /// in input order. Candidates not in the graph are ignored.
    pub fn pick_stalest_among(&self, candidates: &[AirportCode]) -> Option<AirportCode> {
        candidates
            .iter()
            .filter_map(|code| self.airports.get(code))
            .min_by_key(|a| a.last_updated)
            .map(|a| a.airport_code)
    }

    /// Add an airport if it is not already present. Existing entries are left alone.
    pub fn ensure_airport(&mut self, airport: Airport) {
        self.airports.entry(airport.airport_code).or_insert(airport);
    }

    /// Replace the connections of `code` and stamp it as refreshed at `timestamp`.
    ///
    /// The entry is replaced in place; there is never more than one entry per
    /// code. Connection targets that are not yet in the graph are added as
    /// never-refreshed placeholders, so every connection stays resolvable.
    pub fn upsert(
        &mut self,
        code: AirportCode,
        connections: BTreeSet<AirportCode>,
        timestamp: DateTime<Utc>,
    ) {
        for target in &connections {
            self.ensure_airport(Airport::placeholder(*target, target.as_str(), ""));
        }

        let mut connections = connections;
        connections.remove(&code);

        let entry = self
            .airports
            .entry(code)
            .or_insert_with(|| Airport::placeholder(code, code.as_str(), ""));
        entry.connections = connections;
        entry.last_updated = Some(timestamp);
    }

    /// Union with another snapshot.
    ///
    /// Connections are combined; the newer `last_updated` wins; name and
    /// country are kept from `self` unless it only had a placeholder.
    pub fn merge(&mut self, other: ConnectivityGraph) {
        for (code, theirs) in other.airports {
            match self.airports.get_mut(&code) {
                Some(ours) => {
                    ours.connections.extend(theirs.connections);
                    ours.last_updated = ours.last_updated.max(theirs.last_updated);
                    if ours.country_code.is_empty() && !theirs.country_code.is_empty() {
                        ours.name = theirs.name;
                        ours.country_code = theirs.country_code;
                    }
                }
                None => {
                    self.airports.insert(code, theirs);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn airport(c: &str, connections: &[&str], updated: Option<u32>) -> Airport {
        Airport {
            airport_code: code(c),
            name: format!("{c} airport"),
            country_code: "IT".into(),
            connections: connections.iter().map(|s| code(s)).collect(),
            last_updated: updated.map(|d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()),
        }
    }

    const SNAPSHOT: &str = r#"
        {
          "airports": [
            {
              "airportCode": "VIE",
              "name": "Vienna",
              "countryCode": "AT",
              "connections": ["TSF"],
              "lastUpdated": "2024-01-02T10:00:00Z"
            },
            {
              "airportCode": "TSF",
              "name": "Treviso",
              "countryCode": "IT",
              "connections": ["VIE", "XXX"]
            }
          ]
        }
    "#;

    #[test]
    fn decodes_typed_snapshot() {
        let graph = ConnectivityGraph::from_json("test", SNAPSHOT).unwrap();

        assert_eq!(graph.len(), 2);
        let vie = graph.get(&code("VIE")).unwrap();
        assert_eq!(vie.name, "Vienna");
        assert_eq!(vie.country_code, "AT");
        assert!(vie.last_updated.is_some());
        assert!(graph.get(&code("TSF")).unwrap().last_updated.is_none());
    }

    #[test]
    fn dangling_connections_are_pruned() {
        let graph = ConnectivityGraph::from_json("test", SNAPSHOT).unwrap();
        let tsf = graph.connections_of(&code("TSF"));
        assert_eq!(tsf.len(), 1);
        assert!(tsf.contains(&code("VIE")));
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let err = ConnectivityGraph::from_json("test", "{ \"airports\": 3 }").unwrap_err();
        assert!(matches!(err, GraphError::Corrupt { .. }));

        let bad_code = r#"{ "airports": [ { "airportCode": "vie", "name": "Vienna" } ] }"#;
        assert!(ConnectivityGraph::from_json("test", bad_code).is_err());
    }

    #[test]
    fn json_roundtrip() {
        let graph = ConnectivityGraph::from_json("test", SNAPSHOT).unwrap();
        let json = graph.to_json().unwrap();
        let back = ConnectivityGraph::from_json("test", &json).unwrap();
        assert_eq!(back, graph);
    }

    #[test]
    fn unknown_code_has_no_connections() {
        let graph = ConnectivityGraph::from_json("test", SNAPSHOT).unwrap();
        assert!(graph.connections_of(&code("BGY")).is_empty());
        assert!(!graph.serves(&code("BGY"), &code("VIE")));
        assert!(graph.serves(&code("TSF"), &code("VIE")));
    }

    #[test]
    fn counts_edges() {
        let graph = ConnectivityGraph::from_airports([
            airport("AAA", &["BBB", "CCC"], None),
            airport("BBB", &["AAA"], None),
            airport("CCC", &[], None),
        ]);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn stalest_prefers_never_updated_then_oldest() {
        let graph = ConnectivityGraph::from_airports([
            airport("AAA", &[], Some(5)),
            airport("BBB", &[], Some(2)),
            airport("CCC", &[], None),
        ]);

        assert_eq!(
            graph.pick_stalest_among(&[code("AAA"), code("BBB"), code("CCC")]),
            Some(code("CCC"))
        );
        assert_eq!(
            graph.pick_stalest_among(&[code("AAA"), code("BBB")]),
            Some(code("BBB"))
        );
    }

    #[test]
    fn stalest_ties_go_to_first_candidate() {
        let graph = ConnectivityGraph::from_airports([
            airport("AAA", &[], Some(3)),
            airport("BBB", &[], Some(3)),
        ]);

        assert_eq!(
            graph.pick_stalest_among(&[code("BBB"), code("AAA")]),
            Some(code("BBB"))
        );
        assert_eq!(
            graph.pick_stalest_among(&[code("AAA"), code("BBB")]),
            Some(code("AAA"))
        );
    }

    #[test]
    fn stalest_ignores_unknown_candidates() {
        let graph = ConnectivityGraph::from_airports([airport("AAA", &[], Some(3))]);
        assert_eq!(graph.pick_stalest_among(&[code("ZZZ")]), None);
        assert_eq!(
            graph.pick_stalest_among(&[code("ZZZ"), code("AAA")]),
            Some(code("AAA"))
        );
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut graph = ConnectivityGraph::from_airports([
            airport("AAA", &["BBB"], Some(1)),
            airport("BBB", &[], Some(1)),
        ]);
        let stamp = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        graph.upsert(code("AAA"), [code("BBB")].into_iter().collect(), stamp);
        graph.upsert(code("AAA"), BTreeSet::new(), stamp);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.airports().filter(|a| a.airport_code == code("AAA")).count(), 1);
        let aaa = graph.get(&code("AAA")).unwrap();
        assert!(aaa.connections.is_empty());
        assert_eq!(aaa.last_updated, Some(stamp));
        assert_eq!(aaa.name, "AAA airport");
    }

    #[test]
    fn upsert_adds_placeholders_for_new_targets() {
        let mut graph = ConnectivityGraph::new();
        let stamp = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        graph.upsert(code("AAA"), [code("BBB"), code("AAA")].into_iter().collect(), stamp);

        assert_eq!(graph.len(), 2);
        assert!(graph.serves(&code("AAA"), &code("BBB")));
        assert!(!graph.serves(&code("AAA"), &code("AAA")));
        let bbb = graph.get(&code("BBB")).unwrap();
        assert!(bbb.last_updated.is_none());
        assert_eq!(
            graph.pick_stalest_among(&[code("AAA"), code("BBB")]),
            Some(code("BBB"))
        );
    }

    #[test]
    fn merge_unions_connections() {
        let mut a = ConnectivityGraph::from_airports([
            airport("AAA", &["BBB"], Some(1)),
            airport("BBB", &[], Some(1)),
        ]);
        let b = ConnectivityGraph::from_airports([
            airport("AAA", &["CCC"], Some(4)),
            airport("CCC", &["AAA"], None),
        ]);

        a.merge(b);

        assert_eq!(a.len(), 3);
        assert!(a.serves(&code("AAA"), &code("BBB")));
        assert!(a.serves(&code("AAA"), &code("CCC")));
        assert!(a.serves(&code("CCC"), &code("AAA")));
        assert_eq!(
            a.get(&code("AAA")).unwrap().last_updated,
            Some(Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap())
        );
    }
}
