use thiserror::Error;

/// Errors returned by the Gemini gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No credential is configured, or the client was built with an unusable
    /// endpoint. Raised before any network attempt.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status and an error envelope.
    #[error("Gemini API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Required input was empty or malformed; no request was sent.
    #[error("invalid input: {0}")]
    Validation(String),
}

impl GatewayError {
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, GatewayError::Configuration(_))
    }
}
