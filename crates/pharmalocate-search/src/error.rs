use std::path::PathBuf;

use pharmalocate_gemini::GatewayError;
use thiserror::Error;

/// Errors a flow reports to its caller.
///
/// Flows turn backend failures into state-visible messages or fallback
/// values, so callers mostly see `Configuration` and `Validation`.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Missing credential or unusable gateway setup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Required input was empty or refers to nothing; no request was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Gateway(GatewayError),
}

impl From<GatewayError> for SearchError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Configuration(msg) => SearchError::Configuration(msg),
            GatewayError::Validation(msg) => SearchError::Validation(msg),
            other => SearchError::Gateway(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_configuration_and_validation_keep_their_class() {
        let config: SearchError = GatewayError::Configuration("no key".into()).into();
        assert!(matches!(config, SearchError::Configuration(ref m) if m == "no key"));

        let invalid: SearchError = GatewayError::Validation("empty".into()).into();
        assert!(matches!(invalid, SearchError::Validation(ref m) if m == "empty"));

        let api: SearchError = GatewayError::Api {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(api, SearchError::Gateway(GatewayError::Api { .. })));
        assert_eq!(api.to_string(), "Gemini API error (HTTP 500): boom");
    }
}
