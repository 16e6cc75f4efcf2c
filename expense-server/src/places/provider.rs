//! The nearby-place provider seam.

use std::future::Future;

use crate::geo::GeoPoint;

use super::cache::CachedPlaceProvider;
use super::client::HeartRailsClient;
use super::error::ProviderError;
use super::mock::MockPlaceProvider;
use super::types::{PlaceType, RawPlace};

/// Default cap on candidates kept from one lookup.
pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Anything that can list places near a point.
///
/// Results are unranked and may contain entries with unusable coordinates;
/// ranking and filtering happen in the resolver.
pub trait PlaceProvider: Send + Sync {
    fn search_nearby(
        &self,
        origin: GeoPoint,
        place_type: PlaceType,
        options: SearchOptions,
    ) -> impl Future<Output = Result<Vec<RawPlace>, ProviderError>> + Send;
}

/// The provider chosen at startup.
pub enum ConfiguredProvider {
    HeartRails(CachedPlaceProvider<HeartRailsClient>),
    Mock(MockPlaceProvider),
}

impl PlaceProvider for ConfiguredProvider {
    async fn search_nearby(
        &self,
        origin: GeoPoint,
        place_type: PlaceType,
        options: SearchOptions,
    ) -> Result<Vec<RawPlace>, ProviderError> {
        match self {
            ConfiguredProvider::HeartRails(p) => p.search_nearby(origin, place_type, options).await,
            ConfiguredProvider::Mock(p) => p.search_nearby(origin, place_type, options).await,
        }
    }
}
