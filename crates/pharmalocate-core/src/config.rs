use crate::app_config::{AppConfig, Environment};
use crate::pharmacy::Coordinates;
use crate::ConfigError;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a
/// `HashMap` lookup instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f64 = |var: &str| -> Result<Option<f64>, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(None),
        }
    };

    // Blank keys count as missing so an empty `.env` entry doesn't look configured.
    let gemini_api_key = lookup("GEMINI_API_KEY")
        .or_else(|_| lookup("API_KEY"))
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    let env = parse_environment(&or_default("PHARMALOCATE_ENV", "development"));
    let log_level = or_default("PHARMALOCATE_LOG_LEVEL", "info");
    let gemini_model = or_default("PHARMALOCATE_GEMINI_MODEL", DEFAULT_GEMINI_MODEL);
    let gemini_base_url = or_default("PHARMALOCATE_GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL);
    let request_timeout_secs = parse_u64("PHARMALOCATE_REQUEST_TIMEOUT_SECS", "30")?;

    let latitude = parse_f64("PHARMALOCATE_LATITUDE")?;
    let longitude = parse_f64("PHARMALOCATE_LONGITUDE")?;
    let default_location = match (latitude, longitude) {
        (Some(lat), Some(lng)) => {
            let coords = Coordinates::new(lat, lng);
            if !coords.is_valid() {
                return Err(ConfigError::InvalidEnvVar {
                    var: "PHARMALOCATE_LATITUDE".to_string(),
                    reason: format!("coordinates out of range: {coords}"),
                });
            }
            Some(coords)
        }
        (None, None) => None,
        (Some(_), None) => {
            return Err(ConfigError::InvalidEnvVar {
                var: "PHARMALOCATE_LONGITUDE".to_string(),
                reason: "must be set together with PHARMALOCATE_LATITUDE".to_string(),
            })
        }
        (None, Some(_)) => {
            return Err(ConfigError::InvalidEnvVar {
                var: "PHARMALOCATE_LATITUDE".to_string(),
                reason: "must be set together with PHARMALOCATE_LONGITUDE".to_string(),
            })
        }
    };

    Ok(AppConfig {
        env,
        log_level,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        request_timeout_secs,
        default_location,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
