//! The search controller and its flows.
//!
//! State lives behind one async mutex that is never held across a gateway or
//! geo call, so a flow's transitions are atomic from a reader's point of view
//! while other flows keep running. Overlapping searches are tagged with a
//! monotonically increasing sequence number and only the latest dispatched
//! search may write results.

use std::path::Path;

use pharmalocate_core::{
    Coordinates, LocationStatus, PrescriptionScan, SearchState, StockCheck,
};
use pharmalocate_gemini::prompts::NO_MEDICINES_DETECTED;
use pharmalocate_gemini::{normalize_places, GatewayError, GeminiClient};
use tokio::sync::Mutex;

use crate::error::SearchError;
use crate::geo::{GeoError, GeoProvider};

pub const DEFAULT_QUERY: &str = "pharmacies near me";
pub const PRESCRIPTION_QUERY_PREFIX: &str = "Pharmacies with stock of: ";

pub const SEARCH_UNAVAILABLE: &str = "We couldn't reach the search service. Please try again.";
pub const LOCATION_REQUIRED: &str = "Location access is required to detect your pincode.";
pub const PINCODE_NOT_DETECTED: &str = "Could not detect pincode for your location.";
pub const PINCODE_FAILED: &str = "Failed to detect pincode.";
pub const PRESCRIPTION_FAILED: &str = "Could not analyze prescription image.";
pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation is not supported on this device.";

struct Inner {
    state: SearchState,
    /// Sequence number of the most recently dispatched search.
    latest_search: u64,
}

/// Owns [`SearchState`] and runs every user-facing flow against it.
pub struct SearchOrchestrator<G> {
    gateway: GeminiClient,
    geo: G,
    inner: Mutex<Inner>,
}

impl<G: GeoProvider> SearchOrchestrator<G> {
    #[must_use]
    pub fn new(gateway: GeminiClient, geo: G) -> Self {
        Self {
            gateway,
            geo,
            inner: Mutex::new(Inner {
                state: SearchState::default(),
                latest_search: 0,
            }),
        }
    }

    /// A read-only copy of the current state.
    pub async fn snapshot(&self) -> SearchState {
        self.inner.lock().await.state.clone()
    }

    /// Mirrors the search input box.
    pub async fn set_query(&self, query: &str) {
        self.inner.lock().await.state.query = query.to_string();
    }

    /// Start-up hook: acquires the device location once.
    pub async fn initialize(&self) -> Option<Coordinates> {
        self.request_location().await
    }

    /// Asks the geo provider for the device position.
    ///
    /// Moves `location_status` through `requesting` to `granted` or `denied`.
    /// Once granted, a later failed acquisition keeps the previous position
    /// and status.
    pub async fn request_location(&self) -> Option<Coordinates> {
        let previously_granted = {
            let mut inner = self.inner.lock().await;
            let granted = inner.state.location_status == LocationStatus::Granted;
            if !granted {
                inner.state.location_status = LocationStatus::Requesting;
            }
            granted
        };

        let outcome = self.geo.request_position().await.and_then(|coords| {
            if coords.is_valid() {
                Ok(coords)
            } else {
                Err(GeoError::Unavailable(format!(
                    "position out of range: {coords}"
                )))
            }
        });

        let mut inner = self.inner.lock().await;
        match outcome {
            Ok(coords) => {
                tracing::info!(location = %coords, "location acquired");
                inner.state.location = Some(coords);
                inner.state.location_status = LocationStatus::Granted;
                Some(coords)
            }
            Err(e) if previously_granted => {
                tracing::warn!(error = %e, "location refresh failed; keeping previous position");
                inner.state.location
            }
            Err(e) => {
                tracing::warn!(error = %e, "location access denied or failed");
                inner.state.location_status = LocationStatus::Denied;
                if e == GeoError::Unsupported {
                    inner.state.error = Some(GEOLOCATION_UNSUPPORTED.to_string());
                }
                None
            }
        }
    }

    /// Runs a pharmacy search.
    ///
    /// The effective query is the trimmed `override_query` when given, else
    /// the trimmed current query, else `"pharmacies near me"`. An override
    /// also replaces `state.query`. Backend failures leave a generic message
    /// in `state.error` and an empty result list.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Configuration`] if no credential is configured;
    /// no request is sent.
    pub async fn search(&self, override_query: Option<&str>) -> Result<(), SearchError> {
        self.ensure_credential().await?;

        let (seq, query, location) = {
            let mut inner = self.inner.lock().await;
            if let Some(q) = override_query {
                inner.state.query = q.to_string();
            }
            let query = effective_query(override_query, &inner.state.query);
            inner.latest_search += 1;
            let seq = inner.latest_search;

            let state = &mut inner.state;
            state.is_loading = true;
            state.error = None;
            state.results.clear();
            state.summary.clear();
            state.loading_hours.clear();
            (seq, query, state.location)
        };

        tracing::debug!(seq, query = %query, "dispatching search");
        let outcome = self.gateway.search_pharmacies(&query, location).await;

        let mut inner = self.inner.lock().await;
        if seq != inner.latest_search {
            tracing::info!(
                seq,
                latest = inner.latest_search,
                "discarding stale search response"
            );
            return Ok(());
        }

        let state = &mut inner.state;
        state.is_loading = false;
        match outcome {
            Ok(search) => {
                state.results = normalize_places(&search.places);
                state.summary = search.summary;
                tracing::info!(query = %query, results = state.results.len(), "search complete");
                Ok(())
            }
            Err(e) => match SearchError::from(e) {
                SearchError::Gateway(e) => {
                    tracing::error!(query = %query, error = %e, "search failed");
                    state.error = Some(SEARCH_UNAVAILABLE.to_string());
                    Ok(())
                }
                other => {
                    state.error = Some(other.to_string());
                    Err(other)
                }
            },
        }
    }

    /// Searches by the postal code of the device location.
    ///
    /// Acquires the location first when it is not known yet. Reports a
    /// location-required or detection-failed message in `state.error`
    /// without searching when either step comes back empty.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Configuration`] if no credential is configured.
    pub async fn use_current_pincode(&self) -> Result<(), SearchError> {
        self.ensure_credential().await?;
        {
            let mut inner = self.inner.lock().await;
            inner.state.is_detecting_pincode = true;
            inner.state.error = None;
        }

        let result = self.search_by_pincode().await;

        let mut inner = self.inner.lock().await;
        inner.state.is_detecting_pincode = false;
        match result {
            Err(SearchError::Configuration(msg)) => {
                inner.state.error = Some(msg.clone());
                Err(SearchError::Configuration(msg))
            }
            Err(e) => {
                tracing::error!(error = %e, "pincode detection failed");
                inner.state.error = Some(PINCODE_FAILED.to_string());
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    async fn search_by_pincode(&self) -> Result<(), SearchError> {
        let known = self.inner.lock().await.state.location;
        let coords = match known {
            Some(coords) => Some(coords),
            None => self.request_location().await,
        };

        let Some(coords) = coords else {
            self.set_error(LOCATION_REQUIRED).await;
            return Ok(());
        };

        let pincode = self
            .gateway
            .reverse_geocode_to_postal_code(coords.latitude, coords.longitude)
            .await?;
        if pincode.is_empty() {
            self.set_error(PINCODE_NOT_DETECTED).await;
            return Ok(());
        }

        tracing::info!(pincode = %pincode, "pincode detected");
        self.search(Some(&pincode)).await
    }

    /// Fetches opening hours for one result and merges them into it.
    ///
    /// At most one lookup per pharmacy id is in flight; a call made while
    /// one is pending, or for an id not in the results, does nothing. Hours
    /// that arrive after a newer search replaced the results are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Configuration`] if no credential is configured.
    pub async fn check_hours(&self, pharmacy_id: &str) -> Result<(), SearchError> {
        self.ensure_credential().await?;

        let (generation, name, location) = {
            let mut inner = self.inner.lock().await;
            if inner.state.loading_hours.contains(pharmacy_id) {
                tracing::debug!(pharmacy_id, "hours lookup already in flight");
                return Ok(());
            }
            let Some(name) = inner.state.result(pharmacy_id).map(|p| p.name.clone()) else {
                tracing::debug!(pharmacy_id, "hours requested for unknown pharmacy");
                return Ok(());
            };
            inner.state.loading_hours.insert(pharmacy_id.to_string());
            (inner.latest_search, name, inner.state.location)
        };

        let hours = self.gateway.lookup_hours(&name, location).await;

        let mut inner = self.inner.lock().await;
        if generation != inner.latest_search {
            tracing::debug!(pharmacy_id, pharmacy = %name, "results replaced; dropping hours");
            return hours.map(|_| ()).map_err(SearchError::from);
        }
        inner.state.loading_hours.remove(pharmacy_id);
        let hours = hours?;
        if let Some(entry) = inner
            .state
            .results
            .iter_mut()
            .find(|r| r.id == pharmacy_id)
        {
            entry.opening_hours = Some(hours);
        }
        Ok(())
    }

    /// Opens a fresh stock-check view for a result.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] if `pharmacy_id` is not in the
    /// current results.
    pub async fn open_stock_check(&self, pharmacy_id: &str) -> Result<(), SearchError> {
        let mut inner = self.inner.lock().await;
        let name = inner
            .state
            .result(pharmacy_id)
            .map(|p| p.name.clone())
            .ok_or_else(|| unknown_pharmacy(pharmacy_id))?;
        inner.state.stock_check = Some(StockCheck {
            pharmacy_id: pharmacy_id.to_string(),
            pharmacy_name: name,
            ..StockCheck::default()
        });
        Ok(())
    }

    pub async fn close_stock_check(&self) {
        self.inner.lock().await.state.stock_check = None;
    }

    /// Asks for a heuristic stock assessment of `medicine_query` at a result.
    ///
    /// The answer is stored in the open stock-check view (opening one if
    /// needed) and returned. An answer that lands after the view was closed
    /// or switched is dropped from state but still returned.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Validation`] if `medicine_query` is blank or the
    ///   pharmacy is unknown.
    /// - [`SearchError::Configuration`] if no credential is configured.
    pub async fn check_stock(
        &self,
        pharmacy_id: &str,
        medicine_query: &str,
    ) -> Result<String, SearchError> {
        let medicine = medicine_query.trim();
        if medicine.is_empty() {
            return Err(SearchError::Validation(
                "a medicine name is required".to_string(),
            ));
        }
        self.ensure_credential().await?;

        let name = {
            let mut inner = self.inner.lock().await;
            let name = match &inner.state.stock_check {
                Some(view) if view.pharmacy_id == pharmacy_id => view.pharmacy_name.clone(),
                _ => inner
                    .state
                    .result(pharmacy_id)
                    .map(|p| p.name.clone())
                    .ok_or_else(|| unknown_pharmacy(pharmacy_id))?,
            };
            inner.state.stock_check = Some(StockCheck {
                pharmacy_id: pharmacy_id.to_string(),
                pharmacy_name: name.clone(),
                medicine_query: medicine.to_string(),
                result: None,
                is_checking: true,
            });
            name
        };

        let answer = self.gateway.assess_stock(&name, medicine).await;

        let mut inner = self.inner.lock().await;
        match &mut inner.state.stock_check {
            Some(view) if view.pharmacy_id == pharmacy_id && view.medicine_query == medicine => {
                view.is_checking = false;
                if let Ok(answer) = &answer {
                    view.result = Some(answer.clone());
                }
            }
            _ => tracing::debug!(pharmacy_id, "stock check view closed; dropping answer"),
        }
        answer.map_err(SearchError::from)
    }

    /// Reads medicine names off a prescription image.
    ///
    /// Backend failures leave a message in `state.prescription.error`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Configuration`] if no credential is configured.
    /// - [`SearchError::Validation`] if the image is empty or not an image
    ///   MIME type.
    pub async fn analyze_image(&self, image: &[u8], mime_type: &str) -> Result<(), SearchError> {
        self.ensure_credential().await?;
        self.inner.lock().await.state.prescription = PrescriptionScan {
            is_analyzing: true,
            ..PrescriptionScan::default()
        };

        let outcome = self.gateway.extract_medicine_names(image, mime_type).await;

        let mut inner = self.inner.lock().await;
        let scan = &mut inner.state.prescription;
        scan.is_analyzing = false;
        match outcome {
            Ok(medicines) => {
                tracing::info!(medicines = %medicines, "prescription analyzed");
                scan.medicines = medicines;
                Ok(())
            }
            Err(e) => match SearchError::from(e) {
                SearchError::Gateway(e) => {
                    tracing::error!(error = %e, "prescription analysis failed");
                    scan.error = Some(PRESCRIPTION_FAILED.to_string());
                    Ok(())
                }
                other => {
                    scan.error = Some(other.to_string());
                    Err(other)
                }
            },
        }
    }

    /// Reads an image file fully into memory, then analyzes it.
    ///
    /// The MIME type is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// [`SearchError::Io`] if the file cannot be read, otherwise as
    /// [`SearchOrchestrator::analyze_image`].
    pub async fn analyze_image_file(&self, path: &Path) -> Result<(), SearchError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| SearchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.analyze_image(&bytes, mime_type_for_path(path)).await
    }

    /// Searches for pharmacies likely to stock the detected medicines.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Validation`] if no medicines have been detected yet,
    ///   the scan reported none, or an analysis is still running.
    /// - [`SearchError::Configuration`] as [`SearchOrchestrator::search`].
    pub async fn search_prescription(&self) -> Result<(), SearchError> {
        let medicines = {
            let inner = self.inner.lock().await;
            let scan = &inner.state.prescription;
            if scan.is_analyzing {
                return Err(SearchError::Validation(
                    "prescription analysis is still running".to_string(),
                ));
            }
            scan.medicines.trim().to_string()
        };
        if medicines.is_empty()
            || medicines
                .trim_end_matches('.')
                .eq_ignore_ascii_case(NO_MEDICINES_DETECTED)
        {
            return Err(SearchError::Validation(
                "no medicines detected yet".to_string(),
            ));
        }

        self.search(Some(&format!("{PRESCRIPTION_QUERY_PREFIX}{medicines}")))
            .await
    }

    async fn ensure_credential(&self) -> Result<(), SearchError> {
        if self.gateway.has_credential() {
            return Ok(());
        }
        let err = SearchError::from(GatewayError::Configuration(
            "Gemini API key is missing; set GEMINI_API_KEY".to_string(),
        ));
        self.set_error(&err.to_string()).await;
        Err(err)
    }

    async fn set_error(&self, message: &str) {
        self.inner.lock().await.state.error = Some(message.to_string());
    }
}

/// Resolves the query a search actually sends.
#[must_use]
pub fn effective_query(override_query: Option<&str>, current: &str) -> String {
    let trimmed = override_query.unwrap_or(current).trim();
    if trimmed.is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Guesses an image MIME type from a file extension, defaulting to PNG.
#[must_use]
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

fn unknown_pharmacy(pharmacy_id: &str) -> SearchError {
    SearchError::Validation(format!("unknown pharmacy '{pharmacy_id}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_query_defaults_when_both_empty() {
        assert_eq!(effective_query(None, ""), "pharmacies near me");
        assert_eq!(effective_query(None, "   "), "pharmacies near me");
        assert_eq!(effective_query(Some(" "), "aspirin"), "pharmacies near me");
    }

    #[test]
    fn effective_query_prefers_trimmed_override() {
        assert_eq!(effective_query(Some(" 560001 "), "aspirin"), "560001");
        assert_eq!(effective_query(None, " aspirin "), "aspirin");
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(mime_type_for_path(Path::new("rx.JPG")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("rx.jpeg")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("rx.webp")), "image/webp");
        assert_eq!(mime_type_for_path(Path::new("rx.png")), "image/png");
        assert_eq!(mime_type_for_path(Path::new("rx")), "image/png");
    }
}
