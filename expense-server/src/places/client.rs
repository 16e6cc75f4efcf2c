//! HeartRails Express nearest-station client.

use std::time::Duration;

use crate::geo::GeoPoint;

use super::error::ProviderError;
use super::provider::{PlaceProvider, SearchOptions};
use super::types::{HeartRailsResponse, PlaceType, RawPlace};

/// Default base URL for the HeartRails Express JSON API.
pub const DEFAULT_BASE_URL: &str = "https://express.heartrails.com/api/json";

/// Configuration for the HeartRails client.
#[derive(Debug, Clone)]
pub struct HeartRailsConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HeartRailsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HeartRailsConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Client for the `getStations` endpoint.
///
/// The API only knows about railway stations, so searches for any other
/// place type return no results without making a request.
#[derive(Debug, Clone)]
pub struct HeartRailsClient {
    http: reqwest::Client,
    base_url: String,
}

impl HeartRailsClient {
    pub fn new(config: HeartRailsConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch the stations nearest to `origin`.
    pub async fn get_stations(&self, origin: GeoPoint) -> Result<Vec<RawPlace>, ProviderError> {
        let x = origin.longitude.to_string();
        let y = origin.latitude.to_string();

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("method", "getStations"), ("x", &x), ("y", &y)])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_stations(&body)
    }
}

impl PlaceProvider for HeartRailsClient {
    async fn search_nearby(
        &self,
        origin: GeoPoint,
        place_type: PlaceType,
        _options: SearchOptions,
    ) -> Result<Vec<RawPlace>, ProviderError> {
        if place_type != PlaceType::Station {
            tracing::debug!(%place_type, "HeartRails has no data for this place type");
            return Ok(Vec::new());
        }
        self.get_stations(origin).await
    }
}

/// Parse a `getStations` response body.
///
/// An `error` field means the provider refused the query. A missing or
/// non-array `station` field means there is nothing nearby.
pub fn parse_stations(body: &str) -> Result<Vec<RawPlace>, ProviderError> {
    let response: HeartRailsResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Json {
            message: e.to_string(),
        })?;

    if let Some(error) = response.response.error {
        return Err(ProviderError::Rejected(error));
    }

    match response.response.station {
        Some(value @ serde_json::Value::Array(_)) => {
            serde_json::from_value(value).map_err(|e| ProviderError::Json {
                message: e.to_string(),
            })
        }
        _ => Ok(Vec::new()),
    }
}
