//! Web layer for the travel expense tracker.
//!
//! Serves the history page and a JSON API for records, frequent routes,
//! nearby station lookup and CSV export.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
