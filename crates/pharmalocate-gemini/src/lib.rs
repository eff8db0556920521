//! Gemini gateway for PharmaLocate.
//!
//! Issues one `generateContent` call per logical operation (pharmacy search,
//! hours lookup, reverse geocoding, prescription reading, stock assessment)
//! and normalizes map-grounding citations into [`PharmacyResult`]s.
//!
//! [`PharmacyResult`]: pharmalocate_core::PharmacyResult

pub mod client;
pub mod error;
pub mod normalize;
pub mod prompts;
pub mod request;
pub mod types;

pub use client::{GeminiClient, PharmacySearch};
pub use error::GatewayError;
pub use normalize::normalize_places;
pub use request::{GenerationRequest, Grounding, InlineImage};
pub use types::{GenerateContentResponse, GroundingChunk, MapsPlace, WebSource};
