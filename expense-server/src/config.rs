//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::history::DEFAULT_PAGE_SIZE;
use crate::places::{HeartRailsConfig, PlaceCacheConfig, ResolverConfig};

const DEFAULT_DATA_FILE: &str = "data/expenses.json";
const DEFAULT_STATIC_DIR: &str = "static";

/// Errors reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is not a valid socket address: {value:?}")]
    InvalidAddr { key: &'static str, value: String },

    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Defaults applied to history queries that leave fields unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefaults {
    pub page_size: usize,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryDefaults {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Everything `main` needs to start the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// JSON file holding records and routes.
    pub data_file: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Serve nearby stations from this file instead of HeartRails.
    pub places_mock_file: Option<PathBuf>,
    pub heartrails: HeartRailsConfig,
    pub place_cache: PlaceCacheConfig,
    pub resolver: ResolverConfig,
    pub query: QueryDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            places_mock_file: None,
            heartrails: HeartRailsConfig::default(),
            place_cache: PlaceCacheConfig::default(),
            resolver: ResolverConfig::default(),
            query: QueryDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// | Variable                | Default                                   |
    /// |-------------------------|-------------------------------------------|
    /// | `EXPENSE_BIND_ADDR`     | `127.0.0.1:3000`                          |
    /// | `EXPENSE_DATA_FILE`     | `data/expenses.json`                      |
    /// | `EXPENSE_STATIC_DIR`    | `static`                                  |
    /// | `EXPENSE_PAGE_SIZE`     | `20`                                      |
    /// | `HEARTRAILS_BASE_URL`   | `https://express.heartrails.com/api/json` |
    /// | `PLACES_MOCK_FILE`      | unset (use HeartRails)                    |
    /// | `PLACES_CACHE_TTL_SECS` | `300`                                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("EXPENSE_BIND_ADDR") {
            config.bind_addr = value.trim().parse().map_err(|_| ConfigError::InvalidAddr {
                key: "EXPENSE_BIND_ADDR",
                value: value.clone(),
            })?;
        }
        if let Some(value) = get("EXPENSE_DATA_FILE") {
            config.data_file = PathBuf::from(value);
        }
        if let Some(value) = get("EXPENSE_STATIC_DIR") {
            config.static_dir = PathBuf::from(value);
        }
        if let Some(value) = get("EXPENSE_PAGE_SIZE") {
            let page_size = positive("EXPENSE_PAGE_SIZE", &value)?;
            config.query = config.query.with_page_size(page_size as usize);
        }
        if let Some(value) = get("HEARTRAILS_BASE_URL") {
            config.heartrails = config.heartrails.with_base_url(value.trim());
        }
        config.places_mock_file = get("PLACES_MOCK_FILE").map(PathBuf::from);
        if let Some(value) = get("PLACES_CACHE_TTL_SECS") {
            let secs = positive("PLACES_CACHE_TTL_SECS", &value)?;
            config.place_cache.ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let places = match &self.places_mock_file {
            Some(path) => format!("mock file {}", path.display()),
            None => self.heartrails.base_url.clone(),
        };
        write!(
            f,
            "bind={} data={} static={} places={}",
            self.bind_addr,
            self.data_file.display(),
            self.static_dir.display(),
            places
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
        assert_eq!(config.places_mock_file, None);
        assert_eq!(config.place_cache.ttl, Duration::from_secs(300));
        assert_eq!(config.query.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(
            config.heartrails.base_url,
            crate::places::DEFAULT_BASE_URL
        );
    }

    #[test]
    fn overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("EXPENSE_BIND_ADDR", "0.0.0.0:8080"),
            ("EXPENSE_DATA_FILE", "/tmp/x.json"),
            ("EXPENSE_PAGE_SIZE", "50"),
            ("HEARTRAILS_BASE_URL", "http://localhost:9000/api/json"),
            ("PLACES_MOCK_FILE", "data/mock_stations.json"),
            ("PLACES_CACHE_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.data_file, PathBuf::from("/tmp/x.json"));
        assert_eq!(config.query.page_size, 50);
        assert_eq!(config.heartrails.base_url, "http://localhost:9000/api/json");
        assert_eq!(
            config.places_mock_file,
            Some(PathBuf::from("data/mock_stations.json"))
        );
        assert_eq!(config.place_cache.ttl, Duration::from_secs(60));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = AppConfig::from_lookup(lookup(&[("PLACES_MOCK_FILE", "  ")])).unwrap();
        assert_eq!(config.places_mock_file, None);
    }

    #[test]
    fn invalid_values() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("EXPENSE_BIND_ADDR", "localhost")])),
            Err(ConfigError::InvalidAddr { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("PLACES_CACHE_TTL_SECS", "0")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("EXPENSE_PAGE_SIZE", "ten")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }
}
