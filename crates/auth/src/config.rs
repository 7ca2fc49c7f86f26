//! Auth configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `AUTORITHM_DATA_FILE` - path of the local store file
//!   (default: `data/autorithm.json`)
//! - `AUTORITHM_BASE_URL` - public base URL used in reset links
//!   (default: `http://localhost:3000`)
//! - `AUTORITHM_LATENCY_MS` - simulated network latency in milliseconds
//!   (default: 500; set to 0 to disable)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default simulated latency, matching the original client's fixed delay.
const DEFAULT_LATENCY_MS: u64 = 500;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Auth layer configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Path of the local key-value store file.
    pub data_file: PathBuf,
    /// Public base URL, used when emitting reset links.
    pub base_url: String,
    /// Artificial delay applied at the top of each provider operation.
    /// Configurable so tests can run with zero latency while the async
    /// contract stays intact.
    pub simulated_latency: Duration,
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_file = PathBuf::from(get_env_or_default(
            "AUTORITHM_DATA_FILE",
            "data/autorithm.json",
        ));
        let base_url = get_env_or_default("AUTORITHM_BASE_URL", "http://localhost:3000");
        let latency_ms = match std::env::var("AUTORITHM_LATENCY_MS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("AUTORITHM_LATENCY_MS".to_owned(), e.to_string())
            })?,
            Err(_) => DEFAULT_LATENCY_MS,
        };

        Ok(Self {
            data_file,
            base_url,
            simulated_latency: Duration::from_millis(latency_ms),
        })
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/autorithm.json"),
            base_url: "http://localhost:3000".to_owned(),
            simulated_latency: Duration::from_millis(DEFAULT_LATENCY_MS),
        }
    }
}

/// Get an environment variable with a fallback default.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
