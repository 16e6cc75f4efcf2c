//! The place resolver: a small state machine around one nearby lookup.
//!
//! ```text
//! idle ──fetch──▶ locating ──position──▶ loading ──results──▶ success
//!                    │                      │
//!                    └──position error──▶ error ◀──provider error
//! ```
//!
//! Any state returns to `locating` on a new fetch and to `idle` on reset.
//! Every fetch or reset bumps a generation counter; a lookup only commits
//! its outcome while its generation is still current, so a slow lookup
//! never overwrites a newer one.

use serde::Serialize;
use tokio::sync::RwLock;

use super::error::{PositionError, ResolverError};
use super::position::{PositionOptions, PositionSource};
use super::provider::{DEFAULT_MAX_RESULTS, PlaceProvider, SearchOptions};
use super::rank::rank_candidates;
use super::types::{Place, PlaceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverStatus {
    #[default]
    Idle,
    Locating,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    pub position: PositionOptions,
    pub max_results: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            position: PositionOptions::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Observable resolver state.
///
/// `candidates` is non-empty only in `success`, `error` is set only in
/// `error`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverSnapshot {
    pub status: ResolverStatus,
    pub candidates: Vec<Place>,
    pub error: Option<ResolverError>,
    pub generation: u64,
}

impl ResolverSnapshot {
    pub fn is_busy(&self) -> bool {
        matches!(
            self.status,
            ResolverStatus::Locating | ResolverStatus::Loading
        )
    }
}

/// Resolves the current device position to nearby place candidates.
///
/// The resolver owns the provider and the observable state. The position
/// source is supplied per lookup, since each request brings its own fix.
pub struct PlaceResolver<P> {
    provider: P,
    config: ResolverConfig,
    state: RwLock<ResolverSnapshot>,
}

impl<P: PlaceProvider> PlaceResolver<P> {
    pub fn new(provider: P, config: ResolverConfig) -> Self {
        Self {
            provider,
            config,
            state: RwLock::new(ResolverSnapshot::default()),
        }
    }

    pub async fn snapshot(&self) -> ResolverSnapshot {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> ResolverStatus {
        self.state.read().await.status
    }

    pub async fn candidates(&self) -> Vec<Place> {
        self.state.read().await.candidates.clone()
    }

    pub async fn error(&self) -> Option<ResolverError> {
        self.state.read().await.error.clone()
    }

    /// Return to idle and abandon any lookup in flight.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.status = ResolverStatus::Idle;
        state.candidates.clear();
        state.error = None;
        tracing::debug!(generation = state.generation, "place resolver reset");
    }

    /// Look up places of `place_type` near the position `source` reports.
    ///
    /// Never fails: the outcome is recorded in the resolver state, and the
    /// state after the lookup is returned. If a newer fetch or a reset
    /// happened meanwhile, that newer state is what is returned.
    pub async fn fetch_from_current_location(
        &self,
        source: &impl PositionSource,
        place_type: PlaceType,
    ) -> ResolverSnapshot {
        let generation = self.begin().await;
        tracing::info!(generation, %place_type, "nearby lookup started");

        let position = match tokio::time::timeout(
            self.config.position.timeout,
            source.current_position(self.config.position),
        )
        .await
        {
            Ok(Ok(position)) if position.point().is_finite() => position,
            Ok(Ok(position)) => {
                tracing::warn!(?position, "position has non-finite coordinates");
                self.fail(generation, PositionError::PositionUnavailable.into())
                    .await;
                return self.snapshot().await;
            }
            Ok(Err(err)) => {
                tracing::info!(generation, error = %err, "position unavailable");
                self.fail(generation, err.into()).await;
                return self.snapshot().await;
            }
            Err(_) => {
                tracing::info!(generation, "timed out waiting for position");
                self.fail(generation, PositionError::Timeout.into()).await;
                return self.snapshot().await;
            }
        };

        let proceeding = self
            .commit(generation, |state| state.status = ResolverStatus::Loading)
            .await;
        if !proceeding {
            return self.snapshot().await;
        }

        let origin = position.point();
        let options = SearchOptions {
            max_results: self.config.max_results,
        };
        match self.provider.search_nearby(origin, place_type, options).await {
            Ok(raw) => {
                let candidates =
                    rank_candidates(origin, &raw, place_type, self.config.max_results);
                tracing::info!(
                    generation,
                    raw = raw.len(),
                    candidates = candidates.len(),
                    "nearby lookup finished"
                );
                self.commit(generation, move |state| {
                    state.status = ResolverStatus::Success;
                    state.candidates = candidates;
                })
                .await;
            }
            Err(err) => {
                tracing::warn!(generation, error = %err, "nearby place provider failed");
                self.fail(generation, ResolverError::api()).await;
            }
        }

        self.snapshot().await
    }

    async fn begin(&self) -> u64 {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.status = ResolverStatus::Locating;
        state.candidates.clear();
        state.error = None;
        state.generation
    }

    async fn fail(&self, generation: u64, error: ResolverError) {
        self.commit(generation, move |state| {
            state.status = ResolverStatus::Error;
            state.candidates.clear();
            state.error = Some(error);
        })
        .await;
    }

    /// Apply `update` if `generation` is still current.
    async fn commit(&self, generation: u64, update: impl FnOnce(&mut ResolverSnapshot)) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!(
                stale = generation,
                current = state.generation,
                "dropping superseded lookup result"
            );
            return false;
        }
        update(&mut state);
        true
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
