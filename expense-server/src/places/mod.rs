//! Nearby station lookup from the device position.
//!
//! The resolver takes a [`PositionSource`] per lookup, queries a [`PlaceProvider`] and
//! ranks what the provider returns. In the running server the position comes
//! from the browser and the provider is HeartRails Express behind a cache,
//! or a file-backed mock for offline development.

mod cache;
mod client;
mod error;
mod mock;
mod position;
mod provider;
mod rank;
mod resolver;
mod types;

pub use cache::{CachedPlaceProvider, PlaceCacheConfig};
pub use client::{DEFAULT_BASE_URL, HeartRailsClient, HeartRailsConfig, parse_stations};
pub use error::{API_ERROR_MESSAGE, ErrorCode, PositionError, ProviderError, ResolverError};
pub use mock::MockPlaceProvider;
pub use position::{Position, PositionOptions, PositionReport, PositionSource, ReportedPosition};
pub use provider::{ConfiguredProvider, DEFAULT_MAX_RESULTS, PlaceProvider, SearchOptions};
pub use rank::rank_candidates;
pub use resolver::{PlaceResolver, ResolverConfig, ResolverSnapshot, ResolverStatus};
pub use types::{LooseNumber, Place, PlaceId, PlaceType, RawPlace};

/// The resolver as wired up by the server.
pub type AppResolver = PlaceResolver<ConfiguredProvider>;
