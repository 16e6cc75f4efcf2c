//! Application state for the web layer.

use std::sync::Arc;

use crate::config::QueryDefaults;
use crate::places::AppResolver;
use crate::store::RecordStore;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Records and frequent routes
    pub store: Arc<RecordStore>,

    /// Nearby station lookup
    pub resolver: Arc<AppResolver>,

    /// Defaults for history queries
    pub query: QueryDefaults,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: RecordStore, resolver: AppResolver, query: QueryDefaults) -> Self {
        Self {
            store: Arc::new(store),
            resolver: Arc::new(resolver),
            query,
        }
    }
}
