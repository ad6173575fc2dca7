//! Payment backend configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::gateway::HttpGatewayConfig;

use super::error::{check_timeout, check_url, ValidationError};

/// Offset payment backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the payment backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// API version sent when requesting ephemeral keys
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Charge currency (ISO 4217, lowercase)
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            api_version: default_api_version(),
            currency: default_currency(),
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Client settings for `HttpAuthGateway`.
    pub fn http(&self) -> HttpGatewayConfig {
        HttpGatewayConfig::new(self.base_url.clone()).with_timeout(self.timeout())
    }

    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_url("gateway", &self.base_url)?;
        check_timeout("gateway", self.timeout_secs)?;

        let currency_ok =
            self.currency.len() == 3 && self.currency.chars().all(|c| c.is_ascii_alphabetic());
        if !currency_ok {
            return Err(ValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:4567".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_api_version() -> String {
    "2020-08-27".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}
