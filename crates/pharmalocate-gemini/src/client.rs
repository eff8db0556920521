//! HTTP client for the Gemini `generateContent` REST endpoint.
//!
//! Wraps `reqwest` with credential handling, per-operation request
//! configuration, and typed response deserialization. Every operation checks
//! for a credential before touching the network and reports its absence as
//! [`GatewayError::Configuration`].
//!
//! Failure policy differs by operation. [`GeminiClient::search_pharmacies`]
//! and [`GeminiClient::extract_medicine_names`] propagate backend failures;
//! hours, postal-code and stock lookups degrade to a fallback value.

use std::sync::LazyLock;
use std::time::Duration;

use pharmalocate_core::{AppConfig, Coordinates};
use regex::Regex;
use reqwest::{Client, StatusCode, Url};

use crate::error::GatewayError;
use crate::prompts::{self, HOURS_NOT_AVAILABLE, NO_MEDICINES_DETECTED};
use crate::request::{GenerationRequest, Grounding, InlineImage};
use crate::types::{ApiErrorEnvelope, GenerateContentResponse, GroundingChunk};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

const SEARCH_TEMPERATURE: f64 = 0.7;
const HOURS_TEMPERATURE: f64 = 0.1;
const POSTAL_CODE_TEMPERATURE: f64 = 0.1;
const STOCK_TEMPERATURE: f64 = 0.4;

pub const DEFAULT_SUMMARY: &str = "Here are the pharmacies I found nearby.";
pub const STOCK_UNKNOWN: &str = "Please contact the pharmacy directly to confirm availability.";
pub const STOCK_UNAVAILABLE: &str =
    "Unable to verify stock at this time. Please call the pharmacy.";

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5,6}\b").expect("valid postal code regex"));

/// Answer text plus the raw grounding citations of a pharmacy search.
#[derive(Debug, Clone, PartialEq)]
pub struct PharmacySearch {
    pub summary: String,
    pub places: Vec<GroundingChunk>,
}

/// Client for the Gemini API.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    endpoint: Url,
}

impl GeminiClient {
    /// Creates a client pointed at the production Gemini API.
    ///
    /// A missing `api_key` is accepted here; every operation then fails with
    /// [`GatewayError::Configuration`] without sending a request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: Option<&str>, timeout_secs: u64) -> Result<Self, GatewayError> {
        Self::with_base_url(api_key, DEFAULT_MODEL, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client from loaded application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        Self::with_base_url(
            config.gemini_api_key.as_deref(),
            &config.gemini_model,
            config.request_timeout_secs,
            &config.gemini_base_url,
        )
    }

    /// Creates a client with a custom model and base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GatewayError::Configuration`] if
    /// `base_url` or `model` do not form a valid endpoint URL.
    pub fn with_base_url(
        api_key: Option<&str>,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pharmalocate/0.1")
            .build()?;

        // Exactly one trailing slash so the relative join appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(&format!("v1beta/models/{model}:generateContent")))
            .map_err(|e| {
                GatewayError::Configuration(format!("invalid base URL '{base_url}': {e}"))
            })?;

        Ok(Self {
            client,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_owned),
            model: model.to_owned(),
            endpoint,
        })
    }

    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Finds pharmacies matching `query`, biased toward `location` when known.
    ///
    /// An empty answer text is replaced with a generic summary. Grounding
    /// citations are returned raw; see [`crate::normalize_places`].
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Configuration`] if no credential is configured.
    /// - [`GatewayError::Http`], [`GatewayError::Api`] or
    ///   [`GatewayError::Deserialize`] on any transport or backend failure.
    pub async fn search_pharmacies(
        &self,
        query: &str,
        location: Option<Coordinates>,
    ) -> Result<PharmacySearch, GatewayError> {
        let request = GenerationRequest {
            instruction: prompts::pharmacy_search(query),
            grounding: Grounding::Maps { bias: location },
            image: None,
            temperature: Some(SEARCH_TEMPERATURE),
        };

        let response = self.generate(&request, "search_pharmacies").await?;
        let summary = response
            .text()
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());
        let places = response.into_grounding_chunks();

        tracing::info!(
            query,
            places = places.len(),
            biased = location.is_some(),
            "pharmacy search answered"
        );
        Ok(PharmacySearch { summary, places })
    }

    /// Looks up opening hours for a named pharmacy.
    ///
    /// Backend failures degrade to `"Hours not available"`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if no credential is configured.
    pub async fn lookup_hours(
        &self,
        pharmacy_name: &str,
        location: Option<Coordinates>,
    ) -> Result<String, GatewayError> {
        self.credential()?;
        let request = GenerationRequest {
            instruction: prompts::opening_hours(pharmacy_name, location),
            grounding: Grounding::Maps { bias: location },
            image: None,
            temperature: Some(HOURS_TEMPERATURE),
        };

        match self.generate(&request, "lookup_hours").await {
            Ok(response) => Ok(response
                .text()
                .unwrap_or_else(|| HOURS_NOT_AVAILABLE.to_string())),
            Err(e) => {
                tracing::warn!(
                    pharmacy = pharmacy_name,
                    error = %e,
                    "hours lookup failed; using fallback"
                );
                Ok(HOURS_NOT_AVAILABLE.to_string())
            }
        }
    }

    /// Resolves the postal code of an exact coordinate.
    ///
    /// Returns the first 5–6 digit token in the answer, or the trimmed answer
    /// when none is present. Backend failures yield an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if no credential is configured.
    pub async fn reverse_geocode_to_postal_code(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, GatewayError> {
        self.credential()?;
        let request = GenerationRequest {
            instruction: prompts::postal_code(latitude, longitude),
            grounding: Grounding::Maps {
                bias: Some(Coordinates::new(latitude, longitude)),
            },
            image: None,
            temperature: Some(POSTAL_CODE_TEMPERATURE),
        };

        match self.generate(&request, "reverse_geocode").await {
            Ok(response) => Ok(extract_postal_code(&response.text().unwrap_or_default())),
            Err(e) => {
                tracing::warn!(error = %e, "reverse geocoding failed");
                Ok(String::new())
            }
        }
    }

    /// Reads medicine names off a prescription image.
    ///
    /// Returns a comma-separated list, or `"No medicines detected"` when the
    /// backend finds nothing.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Configuration`] if no credential is configured.
    /// - [`GatewayError::Validation`] if the image is empty or `mime_type` is
    ///   not an `image/*` type.
    /// - [`GatewayError::Http`], [`GatewayError::Api`] or
    ///   [`GatewayError::Deserialize`] on any transport or backend failure.
    pub async fn extract_medicine_names(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, GatewayError> {
        self.credential()?;
        if image.is_empty() {
            return Err(GatewayError::Validation("prescription image is empty".into()));
        }
        if !mime_type.starts_with("image/") {
            return Err(GatewayError::Validation(format!(
                "unsupported prescription MIME type '{mime_type}'"
            )));
        }

        let request = GenerationRequest {
            instruction: prompts::prescription(),
            grounding: Grounding::None,
            image: Some(InlineImage {
                mime_type: mime_type.to_owned(),
                data: image.to_vec(),
            }),
            temperature: None,
        };

        let response = self.generate(&request, "extract_medicine_names").await?;
        Ok(response
            .text()
            .unwrap_or_else(|| NO_MEDICINES_DETECTED.to_string()))
    }

    /// Produces a short, heuristic stock assessment.
    ///
    /// Backend failures degrade to a fixed "call the pharmacy" message.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if no credential is configured.
    pub async fn assess_stock(
        &self,
        pharmacy_name: &str,
        medicine_name: &str,
    ) -> Result<String, GatewayError> {
        self.credential()?;
        let request = GenerationRequest {
            instruction: prompts::stock_assessment(pharmacy_name, medicine_name),
            grounding: Grounding::None,
            image: None,
            temperature: Some(STOCK_TEMPERATURE),
        };

        match self.generate(&request, "assess_stock").await {
            Ok(response) => Ok(response.text().unwrap_or_else(|| STOCK_UNKNOWN.to_string())),
            Err(e) => {
                tracing::warn!(
                    pharmacy = pharmacy_name,
                    medicine = medicine_name,
                    error = %e,
                    "stock check failed; using fallback"
                );
                Ok(STOCK_UNAVAILABLE.to_string())
            }
        }
    }

    /// Sends one `generateContent` call and parses the response.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Configuration`] if no credential is configured.
    /// - [`GatewayError::Http`] on network failure.
    /// - [`GatewayError::Api`] on a non-2xx status.
    /// - [`GatewayError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        operation: &str,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let api_key = self.credential()?;
        tracing::debug!(model = %self.model, operation, "sending generateContent request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, api_key)
            .json(&request.to_wire())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::Deserialize {
            context: format!("generateContent({operation})"),
            source: e,
        })
    }

    fn credential(&self) -> Result<&str, GatewayError> {
        self.api_key.as_deref().ok_or_else(|| {
            GatewayError::Configuration(
                "Gemini API key is missing; set GEMINI_API_KEY".to_string(),
            )
        })
    }

    /// Builds an [`GatewayError::Api`] from an error response, preferring the
    /// message inside the JSON error envelope over the raw body.
    fn api_error(status: StatusCode, body: &str) -> GatewayError {
        let message = match serde_json::from_str::<ApiErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.status {
                Some(code) if !envelope.error.message.is_empty() => {
                    format!("{code}: {}", envelope.error.message)
                }
                Some(code) => code,
                None => envelope.error.message,
            },
            Err(_) => body.trim().to_string(),
        };

        GatewayError::Api {
            status: status.as_u16(),
            message: if message.is_empty() {
                status.to_string()
            } else {
                message
            },
        }
    }
}

/// Picks the first 5–6 digit token out of a reverse-geocoding answer.
///
/// Falls back to the trimmed text when no such token exists.
#[must_use]
pub fn extract_postal_code(text: &str) -> String {
    POSTAL_CODE_RE
        .find(text)
        .map_or_else(|| text.trim().to_string(), |m| m.as_str().to_string())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
