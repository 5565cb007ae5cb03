//! Application state for the web layer.

use std::sync::Arc;

use crate::graph::FileGraphStore;
use crate::query::QueryConfig;
use crate::store::MemoryPriceStore;

/// Shared application state.
///
/// The price store is shared with the refresh loop; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    /// Connectivity snapshots
    pub graphs: Arc<FileGraphStore>,

    /// Stored fares
    pub prices: Arc<MemoryPriceStore>,

    /// Query configuration
    pub config: Arc<QueryConfig>,

    /// Snapshots a query may use; a route is valid if any of them serves it
    pub snapshots: Arc<Vec<String>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        graphs: Arc<FileGraphStore>,
        prices: Arc<MemoryPriceStore>,
        config: QueryConfig,
        snapshots: Vec<String>,
    ) -> Self {
        Self {
            graphs,
            prices,
            config: Arc::new(config),
            snapshots: Arc::new(snapshots),
        }
    }
}
