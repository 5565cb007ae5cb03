use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use fare_server::cache::{CacheConfig, CachedCurrencyResolver};
use fare_server::config::ServerConfig;
use fare_server::currency::{CurrencyClientConfig, HttpCurrencyClient};
use fare_server::fares::{FareSourceConfig, HttpFareSource};
use fare_server::graph::{ConnectivityRefresher, FileGraphStore};
use fare_server::metrics::TracingMetrics;
use fare_server::query::QueryConfig;
use fare_server::refresh::{RefreshConfig, RefreshEngine, SourceEntry};
use fare_server::store::MemoryPriceStore;
use fare_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fare_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("Invalid configuration");
    if config.sources.is_empty() {
        tracing::warn!("FARE_SOURCES not set. Nothing will be refreshed.");
    }

    // One client per fare source; each doubles as its airport directory
    let sources: Vec<SourceEntry<HttpFareSource>> = config
        .sources
        .iter()
        .map(|spec| {
            let mut source_config = FareSourceConfig::new(&spec.name, &spec.base_url);
            if let Some(key) = &config.api_key {
                source_config = source_config.with_api_key(key);
            }
            let source = HttpFareSource::new(source_config).expect("Failed to create fare source client");
            SourceEntry::new(source, &spec.name, config.max_requests)
        })
        .collect();
    let sources = Arc::new(sources);

    let currency_client = HttpCurrencyClient::new(CurrencyClientConfig::new(&config.currency_api_url))
        .expect("Failed to create currency client");
    let currency = Arc::new(CachedCurrencyResolver::new(currency_client, &CacheConfig::default()));

    let graphs = Arc::new(FileGraphStore::new(config.graph_dir.clone()));
    let prices = Arc::new(MemoryPriceStore::new());

    // Price refresh: runs at startup, then every interval
    {
        let sources = sources.clone();
        let currency = currency.clone();
        let graphs = graphs.clone();
        let prices = prices.clone();
        let refresh_config = RefreshConfig::default().with_base_currency(&config.base_currency);
        let period = config.refresh_interval;
        tokio::spawn(async move {
            let metrics = TracingMetrics;
            let mut rng = StdRng::from_entropy();
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let now = Utc::now();

                let purged = prices.purge_expired(now).await;
                if purged > 0 {
                    tracing::info!(purged, "purged departed flights");
                }

                let engine = RefreshEngine::new(
                    sources.as_slice(),
                    currency.as_ref(),
                    prices.as_ref(),
                    &metrics,
                    graphs.as_ref(),
                    &refresh_config,
                );
                engine.refresh_prices(&mut rng, now.date_naive(), now).await;
            }
        });
    }

    // Connectivity refresh: one airport per source per tick
    {
        let sources = sources.clone();
        let graphs = graphs.clone();
        let allowed = config.allowed_airports.clone();
        let period = config.airports_refresh_interval;
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                for entry in sources.iter() {
                    let refresher = ConnectivityRefresher::new(
                        &entry.source,
                        graphs.as_ref(),
                        &entry.snapshot,
                        allowed.as_ref(),
                    );
                    if let Err(e) = refresher.refresh_airports(&mut rng, Utc::now()).await {
                        tracing::warn!(snapshot = %entry.snapshot, error = %e, "connectivity refresh failed");
                    }
                }
            }
        });
    }

    let state = AppState::new(graphs, prices, QueryConfig::default(), config.snapshot_names());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await.unwrap();
    tracing::info!(addr = %config.addr, snapshots = ?config.snapshot_names(), "fare server listening");
    axum::serve(listener, app).await.unwrap();
}
