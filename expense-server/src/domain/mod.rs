//! Domain types for the travel expense tracker.
//!
//! Records and routes are validated at the edge (see [`validation`]); code
//! that receives a [`TravelRecord`] can trust its date and fare.

mod fare;
mod record;
pub mod validation;

pub use fare::{Fare, InvalidFare};
pub use record::{
    FrequentRoute, InvalidTransportationType, RecordId, RouteDetails, TransportationType,
    TravelRecord,
};
pub use validation::{RecordDraft, RecordInput, RouteDraft, RouteInput, ValidationErrors};
