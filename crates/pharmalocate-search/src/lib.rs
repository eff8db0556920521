//! Search orchestration for PharmaLocate.
//!
//! [`SearchOrchestrator`] owns the application [`SearchState`] and sequences
//! location acquisition, gateway calls and state transitions for the search,
//! pincode, hours, stock and prescription flows. The presentation layer reads
//! snapshots and dispatches intents; it never mutates state directly.
//!
//! [`SearchState`]: pharmalocate_core::SearchState

pub mod error;
pub mod geo;
pub mod orchestrator;

pub use error::SearchError;
pub use geo::{GeoError, GeoProvider, StaticGeoProvider};
pub use orchestrator::{effective_query, mime_type_for_path, SearchOrchestrator};
