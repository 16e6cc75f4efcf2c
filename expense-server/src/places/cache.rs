//! Caching layer for nearby-place lookups.
//!
//! Positions are bucketed by rounding to a fixed number of decimal places
//! (4 places is roughly 11 m of latitude), so repeated lookups from the same
//! spot reuse one provider response. Failures are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::geo::GeoPoint;

use super::error::ProviderError;
use super::provider::{PlaceProvider, SearchOptions};
use super::types::{PlaceType, RawPlace};

/// Cache key: (latitude bucket, longitude bucket, place type).
type PlaceKey = (i64, i64, PlaceType);

type PlaceEntry = Arc<Vec<RawPlace>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct PlaceCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// Decimal places kept when bucketing coordinates.
    pub precision: u32,
}

impl Default for PlaceCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 256,
            precision: 4,
        }
    }
}

/// A provider wrapped with a TTL cache.
pub struct CachedPlaceProvider<P> {
    inner: P,
    entries: MokaCache<PlaceKey, PlaceEntry>,
    scale: f64,
}

impl<P: PlaceProvider> CachedPlaceProvider<P> {
    pub fn new(inner: P, config: &PlaceCacheConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            entries,
            scale: 10f64.powi(config.precision as i32),
        }
    }

    fn key(&self, origin: GeoPoint, place_type: PlaceType) -> PlaceKey {
        (
            (origin.latitude * self.scale).round() as i64,
            (origin.longitude * self.scale).round() as i64,
            place_type,
        )
    }

    #[cfg(test)]
    fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: PlaceProvider> PlaceProvider for CachedPlaceProvider<P> {
    async fn search_nearby(
        &self,
        origin: GeoPoint,
        place_type: PlaceType,
        options: SearchOptions,
    ) -> Result<Vec<RawPlace>, ProviderError> {
        let key = self.key(origin, place_type);

        if let Some(cached) = self.entries.get(&key).await {
            tracing::debug!(?key, "nearby lookup served from cache");
            return Ok(cached.as_ref().clone());
        }

        let places = self.inner.search_nearby(origin, place_type, options).await?;
        self.entries.insert(key, Arc::new(places.clone())).await;

        Ok(places)
    }
}
