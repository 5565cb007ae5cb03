//! Query execution: whitelist routes, fetch legs, match and rank.

use std::collections::HashMap;

use futures::future::try_join_all;

use crate::domain::{AirportCode, FlightRecord, Route, Trip};
use crate::graph::ConnectivityGraph;
use crate::store::PriceStore;

use super::config::QueryConfig;
use super::matcher::match_legs;
use super::rank::rank_trips;
use super::request::{QueryError, ScanQueryRequest, ValidatedQuery};

/// Answers trip queries against a price store.
///
/// Routes the connectivity graph does not know are never looked up.
pub struct QueryEngine<'a, P: PriceStore> {
    store: &'a P,
    graph: &'a ConnectivityGraph,
    config: &'a QueryConfig,
}

impl<'a, P: PriceStore> QueryEngine<'a, P> {
    pub fn new(store: &'a P, graph: &'a ConnectivityGraph, config: &'a QueryConfig) -> Self {
        Self {
            store,
            graph,
            config,
        }
    }

    /// Find the cheapest round trips for `request`.
    ///
    /// Validation errors are returned before the store is touched.
    pub async fn query_and_match(&self, request: &ScanQueryRequest) -> Result<Vec<Trip>, QueryError> {
        let query = request.validate(self.config)?;

        let pools = if query.return_to_same_airport {
            HashMap::new()
        } else {
            self.prefetch_return_pools(&query).await?
        };

        let mut trips = Vec::new();
        let mut pairs_searched = 0usize;
        for &departure in &query.departures {
            for &destination in &query.destinations {
                let Some(route) = self.whitelisted(departure, destination) else {
                    continue;
                };
                pairs_searched += 1;

                let outbound = self.legs(route, &query).await?;
                if outbound.is_empty() {
                    continue;
                }

                let matched = if query.return_to_same_airport {
                    let returns = match self.whitelisted(destination, departure) {
                        Some(reverse) => self.legs(reverse, &query).await?,
                        None => Vec::new(),
                    };
                    match_legs(&outbound, &returns, query.min_days, query.max_days)
                } else {
                    let returns = pools.get(&destination).map(Vec::as_slice).unwrap_or(&[]);
                    match_legs(&outbound, returns, query.min_days, query.max_days)
                };

                tracing::debug!(%route, outbound = outbound.len(), matched = matched.len(), "matched route");
                trips.extend(matched);
            }
        }

        let matched = trips.len();
        let ranked = rank_trips(trips, query.max_results);
        tracing::info!(
            pairs = pairs_searched,
            matched,
            returned = ranked.len(),
            "trip query finished"
        );
        Ok(ranked)
    }

    /// The route `origin -> destination` if the graph serves it.
    fn whitelisted(&self, origin: AirportCode, destination: AirportCode) -> Option<Route> {
        if !self.graph.serves(&origin, &destination) {
            return None;
        }
        Route::new(origin, destination).ok()
    }

    async fn legs(&self, route: Route, query: &ValidatedQuery) -> Result<Vec<FlightRecord>, QueryError> {
        Ok(self
            .store
            .query_range(&route, query.window_start, query.window_end)
            .await?)
    }

    /// For each destination, every leg back to any requested departure
    /// airport, sorted by departure.
    ///
    /// Fetched once per destination and shared by every outbound pair.
    async fn prefetch_return_pools(
        &self,
        query: &ValidatedQuery,
    ) -> Result<HashMap<AirportCode, Vec<FlightRecord>>, QueryError> {
        let mut pools = HashMap::with_capacity(query.destinations.len());

        for &destination in &query.destinations {
            let routes: Vec<Route> = query
                .departures
                .iter()
                .filter_map(|&home| self.whitelisted(destination, home))
                .collect();

            let fetched = try_join_all(routes.iter().map(|route| self.legs(*route, query))).await?;

            // Each route comes back sorted; their union does not
            let mut pool: Vec<FlightRecord> = fetched.into_iter().flatten().collect();
            pool.sort_by_key(|leg| leg.departure);

            tracing::debug!(%destination, routes = routes.len(), legs = pool.len(), "prefetched return pool");
            pools.insert(destination, pool);
        }

        Ok(pools)
    }
}
