//! Normalization of grounding citations into [`PharmacyResult`]s.
//!
//! Only map-place citations are used. Each surviving entry gets a stable id,
//! display defaults for missing fields, and the list is collapsed so that no
//! two results share a map link. When links collide the first occurrence wins,
//! both its position and its fields.

use std::collections::HashSet;

use pharmalocate_core::PharmacyResult;

use crate::types::{GroundingChunk, MapsPlace};

pub const UNKNOWN_PHARMACY: &str = "Unknown Pharmacy";
pub const PLACEHOLDER_URI: &str = "#";
pub const DEFAULT_SNIPPET: &str = "View details on Google Maps";

/// Converts grounding chunks into a deduplicated, ordered result list.
///
/// `index` in the synthesized `pharmacy-{index}` id counts map-place chunks
/// only, so web citations never shift the fallback ids. A place id the
/// backend repeats across distinct links gets an `-{index}` suffix so ids
/// stay unique within the list.
#[must_use]
pub fn normalize_places(chunks: &[GroundingChunk]) -> Vec<PharmacyResult> {
    let mut seen_links = HashSet::new();
    let mut seen_ids = HashSet::new();
    let mut results = Vec::new();

    let places = chunks.iter().filter_map(|chunk| match chunk {
        GroundingChunk::Maps(place) => Some(place),
        GroundingChunk::Web(_) | GroundingChunk::Other => None,
    });

    for (index, place) in places.enumerate() {
        let mut result = normalize_place(place, index);
        if !seen_links.insert(result.maps_uri.clone()) {
            continue;
        }
        if !seen_ids.insert(result.id.clone()) {
            result.id = format!("{}-{index}", result.id);
            seen_ids.insert(result.id.clone());
        }
        results.push(result);
    }

    results
}

/// Maps one citation to a result, applying defaults for absent fields.
#[must_use]
pub fn normalize_place(place: &MapsPlace, index: usize) -> PharmacyResult {
    let snippet = place
        .place_answer_sources
        .as_ref()
        .and_then(|s| s.review_snippets.first())
        .and_then(|r| non_empty(r.content.as_deref()))
        .unwrap_or(DEFAULT_SNIPPET);

    PharmacyResult {
        id: non_empty(place.place_id.as_deref())
            .map_or_else(|| format!("pharmacy-{index}"), str::to_string),
        name: non_empty(place.title.as_deref())
            .unwrap_or(UNKNOWN_PHARMACY)
            .to_string(),
        snippet: snippet.to_string(),
        maps_uri: non_empty(place.uri.as_deref())
            .unwrap_or(PLACEHOLDER_URI)
            .to_string(),
        opening_hours: None,
        address: non_empty(place.address.as_deref()).map(str::to_string),
        rating: None,
        distance: None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
