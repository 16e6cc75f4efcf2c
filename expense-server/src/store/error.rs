//! Record store error types.

use crate::domain::RecordId;

/// Errors from the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("travel record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("frequent route not found: {0}")]
    RouteNotFound(RecordId),

    /// Reading or writing the data file failed
    #[error("data file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be serialized
    #[error("data file JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::RecordNotFound(_) | StoreError::RouteNotFound(_)
        )
    }
}
