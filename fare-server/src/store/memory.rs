//! In-memory price store with expiry.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{FlightRecord, Route};

use super::{MAX_BATCH_SIZE, PriceStore, StoreError};

type RouteTable = BTreeMap<NaiveDateTime, FlightRecord>;

/// Price store backed by a map of route to departure-ordered records.
///
/// Records whose `expires_at` has passed are invisible to reads and are
/// dropped by [`MemoryPriceStore::purge_expired`].
#[derive(Debug, Default)]
pub struct MemoryPriceStore {
    routes: RwLock<HashMap<Route, RouteTable>>,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included.
    pub async fn len(&self) -> usize {
        self.routes.read().await.values().map(BTreeMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every record expired as of `now`. Returns how many were dropped.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut routes = self.routes.write().await;
        let mut dropped = 0;
        for table in routes.values_mut() {
            let before = table.len();
            table.retain(|_, record| !record.is_expired(now));
            dropped += before - table.len();
        }
        routes.retain(|_, table| !table.is_empty());
        if dropped > 0 {
            tracing::debug!(dropped, "purged expired flight records");
        }
        dropped
    }

    async fn query_range_at(
        &self,
        route: &Route,
        start: NaiveDateTime,
        end: NaiveDateTime,
        now: DateTime<Utc>,
    ) -> Vec<FlightRecord> {
        if end < start {
            return Vec::new();
        }
        let routes = self.routes.read().await;
        routes
            .get(route)
            .map(|table| {
                table
                    .range(start..=end)
                    .map(|(_, record)| record)
                    .filter(|record| !record.is_expired(now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl PriceStore for MemoryPriceStore {
    async fn batch_write(&self, records: Vec<FlightRecord>) -> Result<(), StoreError> {
        if records.len() > MAX_BATCH_SIZE {
            return Err(StoreError::BatchTooLarge {
                size: records.len(),
                max: MAX_BATCH_SIZE,
            });
        }

        let mut routes = self.routes.write().await;
        for record in records {
            routes
                .entry(record.route)
                .or_default()
                .insert(record.departure, record);
        }
        Ok(())
    }

    async fn query_range(
        &self,
        route: &Route,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<FlightRecord>, StoreError> {
        Ok(self.query_range_at(route, start, end, Utc::now()).await)
    }
}
