//! Shared domain types and configuration for PharmaLocate.

pub mod app_config;
pub mod config;
pub mod pharmacy;
pub mod state;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use pharmacy::{Coordinates, PharmacyResult};
pub use state::{LocationStatus, PrescriptionScan, SearchState, StockCheck};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
