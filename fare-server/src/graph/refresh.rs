//! Incremental connectivity refresh.
//!
//! Each run refreshes a single airport: a random airport from the fare
//! source's directory if it is new to the snapshot, otherwise the snapshot
//! airport refreshed longest ago. Over many runs every airport gets visited
//! while each run costs only two directory calls.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::domain::AirportCode;
use crate::fares::FareSourceError;

use super::error::GraphError;
use super::store::GraphStore;
use super::{Airport, ConnectivityGraph};

/// An airport as listed by a fare source.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportInfo {
    pub code: AirportCode,
    pub name: String,
    pub country_code: String,
}

impl AirportInfo {
    fn to_placeholder(&self) -> Airport {
        Airport::placeholder(self.code, &self.name, &self.country_code)
    }
}

/// A fare source's airport listing.
pub trait AirportDirectory: Send + Sync {
    /// All airports the source serves.
    fn list_airports(&self) -> impl Future<Output = Result<Vec<AirportInfo>, FareSourceError>> + Send;

    /// Airports with a direct flight from `code`.
    fn connections_from(
        &self,
        code: &AirportCode,
    ) -> impl Future<Output = Result<Vec<AirportCode>, FareSourceError>> + Send;
}

/// Errors from a connectivity refresh run.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The directory call failed
    #[error("airport directory error: {0}")]
    Source(#[from] FareSourceError),

    /// Loading or storing the snapshot failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Nothing left after applying the allowed-airport filter
    #[error("airport directory returned no usable airports")]
    NoAirports,
}

/// Refreshes one snapshot from one directory.
pub struct ConnectivityRefresher<'a, D: AirportDirectory, G: GraphStore> {
    directory: &'a D,
    store: &'a G,
    snapshot: &'a str,
    allowed: Option<&'a BTreeSet<AirportCode>>,
}

impl<'a, D: AirportDirectory, G: GraphStore> ConnectivityRefresher<'a, D, G> {
    /// Create a refresher.
    ///
    /// When `allowed` is set, airports outside it are ignored both as
    /// candidates and as connection targets.
    pub fn new(
        directory: &'a D,
        store: &'a G,
        snapshot: &'a str,
        allowed: Option<&'a BTreeSet<AirportCode>>,
    ) -> Self {
        Self {
            directory,
            store,
            snapshot,
            allowed,
        }
    }

    fn is_allowed(&self, code: &AirportCode) -> bool {
        self.allowed.is_none_or(|set| set.contains(code))
    }

    /// Refresh one airport and store the updated snapshot.
    ///
    /// Returns the refreshed airport's code.
    pub async fn refresh_airports<R: Rng + Send>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<AirportCode, DirectoryError> {
        let listed: Vec<AirportInfo> = self
            .directory
            .list_airports()
            .await?
            .into_iter()
            .filter(|a| self.is_allowed(&a.code))
            .collect();

        let mut graph = match ConnectivityGraph::load(self.store, self.snapshot).await {
            Ok(graph) => graph,
            Err(e) if e.is_not_found() => {
                tracing::info!(snapshot = self.snapshot, "starting a new connectivity snapshot");
                ConnectivityGraph::new()
            }
            Err(e) => return Err(e.into()),
        };

        let chosen = choose_airport(&graph, &listed, rng).ok_or(DirectoryError::NoAirports)?;

        let connections: BTreeSet<AirportCode> = self
            .directory
            .connections_from(&chosen)
            .await?
            .into_iter()
            .filter(|c| self.is_allowed(c))
            .collect();

        let by_code: HashMap<AirportCode, &AirportInfo> =
            listed.iter().map(|a| (a.code, a)).collect();
        for code in connections.iter().chain(std::iter::once(&chosen)) {
            if let Some(info) = by_code.get(code) {
                graph.ensure_airport(info.to_placeholder());
            }
        }

        let count = connections.len();
        graph.upsert(chosen, connections, now);
        self.store.put_snapshot(self.snapshot, &graph).await?;

        tracing::info!(
            snapshot = self.snapshot,
            airport = %chosen,
            connections = count,
            airports = graph.len(),
            "refreshed airport connections"
        );
        Ok(chosen)
    }
}

/// Pick the airport to refresh.
///
/// A random listed airport wins if the snapshot does not know it yet;
/// otherwise the stalest snapshot airport is refreshed instead.
fn choose_airport<R: Rng + ?Sized>(
    graph: &ConnectivityGraph,
    listed: &[AirportInfo],
    rng: &mut R,
) -> Option<AirportCode> {
    let random = listed.choose(rng)?;

    if !graph.contains(&random.code) {
        return Some(random.code);
    }

    let known: Vec<AirportCode> = graph.airports().map(|a| a.airport_code).collect();
    graph.pick_stalest_among(&known)
}
