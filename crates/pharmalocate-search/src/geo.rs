//! Device-location contract.

use std::future::Future;

use pharmalocate_core::Coordinates;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    /// The user or platform refused access.
    #[error("location access denied: {0}")]
    Denied(String),

    /// Access was allowed but no fix could be obtained.
    #[error("location unavailable: {0}")]
    Unavailable(String),

    /// The host has no location capability at all.
    #[error("geolocation is not supported on this device")]
    Unsupported,
}

/// Supplies the device position on request.
///
/// Called once at start-up and again whenever a flow needs a position that
/// is not yet known. May deny or fail.
pub trait GeoProvider: Send + Sync {
    fn request_position(&self) -> impl Future<Output = Result<Coordinates, GeoError>> + Send;
}

/// Provider backed by a fixed, configured position.
///
/// Reports [`GeoError::Unavailable`] when no position is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticGeoProvider {
    position: Option<Coordinates>,
}

impl StaticGeoProvider {
    #[must_use]
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

impl GeoProvider for StaticGeoProvider {
    async fn request_position(&self) -> Result<Coordinates, GeoError> {
        self.position
            .ok_or_else(|| GeoError::Unavailable("no device position configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_configured_position() {
        let provider = StaticGeoProvider::new(Some(Coordinates::new(12.97, 77.59)));
        assert_eq!(
            provider.request_position().await,
            Ok(Coordinates::new(12.97, 77.59))
        );
    }

    #[tokio::test]
    async fn static_provider_without_position_is_unavailable() {
        let provider = StaticGeoProvider::default();
        assert!(matches!(
            provider.request_position().await,
            Err(GeoError::Unavailable(_))
        ));
    }
}
