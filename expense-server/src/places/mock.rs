//! Mock place provider for running without network access.
//!
//! Loads a station list from a JSON file in the same shape as a HeartRails
//! `getStations` response and serves it for every lookup.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::geo::GeoPoint;

use super::client::parse_stations;
use super::error::ProviderError;
use super::provider::{PlaceProvider, SearchOptions};
use super::types::{PlaceType, RawPlace};

/// Serves a fixed station list regardless of origin.
///
/// Entries carry no precomputed distance unless the file supplies one, so
/// ranking falls back to great-circle distance from the caller's position.
#[derive(Clone)]
pub struct MockPlaceProvider {
    stations: Arc<RwLock<Vec<RawPlace>>>,
}

impl MockPlaceProvider {
    /// Load stations from `path`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let stations = load(path.as_ref())?;
        Ok(Self::from_stations(stations))
    }

    pub fn from_stations(stations: Vec<RawPlace>) -> Self {
        Self {
            stations: Arc::new(RwLock::new(stations)),
        }
    }

    pub async fn station_count(&self) -> usize {
        self.stations.read().await.len()
    }

    /// Reload mock data from disk (useful for development).
    pub async fn reload(&self, path: impl AsRef<Path>) -> Result<(), ProviderError> {
        let fresh = load(path.as_ref())?;
        *self.stations.write().await = fresh;
        Ok(())
    }
}

fn load(path: &Path) -> Result<Vec<RawPlace>, ProviderError> {
    let json = std::fs::read_to_string(path).map_err(|e| ProviderError::Mock {
        message: format!("Failed to read {:?}: {}", path, e),
    })?;

    let stations = parse_stations(&json).map_err(|e| ProviderError::Mock {
        message: format!("Failed to parse {:?}: {}", path, e),
    })?;

    if stations.is_empty() {
        return Err(ProviderError::Mock {
            message: format!("No stations found in {:?}", path),
        });
    }

    Ok(stations)
}

impl PlaceProvider for MockPlaceProvider {
    async fn search_nearby(
        &self,
        _origin: GeoPoint,
        place_type: PlaceType,
        _options: SearchOptions,
    ) -> Result<Vec<RawPlace>, ProviderError> {
        if place_type != PlaceType::Station {
            return Ok(Vec::new());
        }
        Ok(self.stations.read().await.clone())
    }
}
