//! Application configuration module
//!
//! Configuration is read from environment variables using the `config` and
//! `dotenvy` crates. Variables carry the `TRIP_OFFSET` prefix and nested
//! values are separated by double underscores. Every section has defaults,
//! so an empty environment yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use trip_offset::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Payment backend at {}", config.gateway.base_url);
//! ```

mod error;
mod gateway;
mod geocoding;
mod logging;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use geocoding::GeocodingConfig;
pub use logging::LoggingConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Payment backend (base URL, timeout, currency)
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Geocoding provider and session limits
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Profile storage location
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TRIP_OFFSET` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `TRIP_OFFSET__GATEWAY__BASE_URL=...` -> `gateway.base_url = ...`
    /// - `TRIP_OFFSET__GEOCODING__MAX_RESULTS=5` -> `geocoding.max_results = 5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TRIP_OFFSET")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.gateway.validate()?;
        self.geocoding.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
