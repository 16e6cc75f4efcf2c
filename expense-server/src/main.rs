use std::error::Error;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use expense_server::config::AppConfig;
use expense_server::places::{
    CachedPlaceProvider, ConfiguredProvider, HeartRailsClient, MockPlaceProvider, PlaceResolver,
};
use expense_server::store::{RecordStore, StoreFile};
use expense_server::web::{AppState, create_router};

const DEFAULT_LOG_FILTER: &str = "expense_server=info,tower_http=info";

/// How often to re-read the mock station file.
const MOCK_RELOAD_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(%config, "starting");

    // Records and routes
    let store = RecordStore::open(StoreFile::new(&config.data_file));

    // Nearby station lookup
    let provider = match &config.places_mock_file {
        Some(path) => {
            let mock = MockPlaceProvider::new(path)?;
            tracing::info!(stations = mock.station_count().await, "using mock station data");

            let reloading = mock.clone();
            let path = path.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(MOCK_RELOAD_INTERVAL);
                interval.tick().await; // first tick is immediate
                loop {
                    interval.tick().await;
                    if let Err(e) = reloading.reload(&path).await {
                        tracing::warn!(error = %e, path = %path.display(), "mock station reload failed");
                    }
                }
            });

            ConfiguredProvider::Mock(mock)
        }
        None => {
            let client = HeartRailsClient::new(config.heartrails.clone())?;
            ConfiguredProvider::HeartRails(CachedPlaceProvider::new(client, &config.place_cache))
        }
    };
    let resolver = PlaceResolver::new(provider, config.resolver);

    let state = AppState::new(store, resolver, config.query);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Travel expense tracker listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
