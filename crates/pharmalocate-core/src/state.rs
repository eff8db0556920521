//! Application state read by the presentation layer.
//!
//! The orchestrator owns the only mutable copy; everything else receives
//! cloned snapshots.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::pharmacy::{Coordinates, PharmacyResult};

/// Progress of device-location acquisition.
///
/// `Idle -> Requesting -> {Granted, Denied}`; `Denied -> Requesting` may be
/// re-entered when the user retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationStatus {
    #[default]
    Idle,
    Requesting,
    Granted,
    Denied,
}

impl std::fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationStatus::Idle => write!(f, "idle"),
            LocationStatus::Requesting => write!(f, "requesting"),
            LocationStatus::Granted => write!(f, "granted"),
            LocationStatus::Denied => write!(f, "denied"),
        }
    }
}

/// Transient view of an open stock check for a single pharmacy.
///
/// Never merged into [`SearchState::results`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCheck {
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub medicine_query: String,
    pub result: Option<String>,
    pub is_checking: bool,
}

/// State of the prescription scan dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionScan {
    pub is_analyzing: bool,
    /// Comma-separated medicine names as returned by the backend.
    pub medicines: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<PharmacyResult>,
    pub summary: String,
    pub is_loading: bool,
    pub error: Option<String>,
    pub location: Option<Coordinates>,
    pub location_status: LocationStatus,
    pub is_detecting_pincode: bool,
    /// Pharmacy ids with an hours lookup in flight.
    pub loading_hours: BTreeSet<String>,
    pub stock_check: Option<StockCheck>,
    pub prescription: PrescriptionScan,
}

impl SearchState {
    /// Looks up a result by its assigned id.
    #[must_use]
    pub fn result(&self, id: &str) -> Option<&PharmacyResult> {
        self.results.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle_and_empty() {
        let state = SearchState::default();
        assert_eq!(state.location_status, LocationStatus::Idle);
        assert!(state.location.is_none());
        assert!(state.results.is_empty() && state.summary.is_empty());
    }

    #[test]
    fn location_status_serializes_lowercase() {
        let json = serde_json::to_string(&LocationStatus::Granted).unwrap();
        assert_eq!(json, "\"granted\"");
    }

    #[test]
    fn result_finds_entry_by_id() {
        let mut state = SearchState::default();
        state.results.push(PharmacyResult {
            id: "place-1".to_string(),
            name: "MedPlus".to_string(),
            snippet: "View details on Google Maps".to_string(),
            maps_uri: "https://maps.google.com/?cid=1".to_string(),
            opening_hours: None,
            address: None,
            rating: None,
            distance: None,
        });

        assert_eq!(state.result("place-1").map(|r| r.name.as_str()), Some("MedPlus"));
        assert!(state.result("place-2").is_none());
    }
}
