//! Device position sources.
//!
//! The position comes from the browser's Geolocation API. The page posts the
//! fix (or the Geolocation error code) along with its lookup request, and
//! the handler passes it to the resolver as a [`ReportedPosition`].

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

use super::error::PositionError;

/// A single position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters, when known.
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// How a position should be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Give up after this long.
    pub timeout: Duration,
    /// Request a GPS-grade fix. The browser decides whether it can.
    pub high_accuracy: bool,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
            high_accuracy: true,
        }
    }
}

/// Something that can report the current device position.
pub trait PositionSource: Send + Sync {
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = Result<Position, PositionError>> + Send;
}

/// Outcome of one Geolocation API call, as reported by the browser.
pub type PositionReport = Result<Position, PositionError>;

/// The browser's answer for one lookup.
///
/// Each lookup request carries its own report, so overlapping lookups never
/// see each other's fixes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportedPosition(pub PositionReport);

impl From<PositionReport> for ReportedPosition {
    fn from(report: PositionReport) -> Self {
        Self(report)
    }
}

impl PositionSource for ReportedPosition {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, PositionError> {
        self.0
    }
}
