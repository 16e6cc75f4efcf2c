//! Persistent storage for travel records and frequent routes.
//!
//! The whole data set lives in one JSON document on disk, loaded at start-up
//! and rewritten after every change.

mod error;
mod file;
mod ids;
mod records;

pub use error::StoreError;
pub use file::{StoreDocument, StoreFile};
pub use ids::IdGenerator;
pub use records::RecordStore;
