//! Flight dashboard HTTP server.
//!
//! Loads `flights.toml` (if present), creates the configured record source,
//! warms the dataset cache and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! # Serve a local CSV or JSON export
//! FLIGHTS_FILE=data/flights.csv cargo run --bin flight-server
//!
//! # Serve a JSON API (requires the http-source feature)
//! FLIGHTS_URL=https://example.org/flights \
//!   cargo run --bin flight-server --features http-source
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `FLIGHT_SOURCE_TYPE`: local | file | http
//! - `FLIGHTS_FILE`, `FLIGHTS_URL`: source location
//! - `FLIGHTS_CACHE_TTL_SECS`: dataset cache lifetime
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flight_dashboard::http::{create_router, AppState};
use flight_dashboard::source::{AppConfig, DatasetCache, SourceFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting flight dashboard server");

    let config = AppConfig::load()?;
    let source = SourceFactory::from_config(&config)?;
    info!("Record source: {}", source.describe());

    let cache = DatasetCache::new(config.cache.ttl());
    // A failed warm-up is not fatal: requests retry the load and report 503.
    match cache.get_or_load(source.as_ref()).await {
        Ok(dataset) => info!("Dataset ready: {} rows", dataset.len()),
        Err(e) => warn!("Initial dataset load failed: {}", e),
    }

    let state = AppState::new(source, cache, config.dashboard.clone());
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
