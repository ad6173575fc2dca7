//! Shared Mapbox configuration.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Mapbox API configuration.
#[derive(Clone)]
pub struct MapboxConfig {
    access_token: SecretString,
    /// Base URL for the API (default: https://api.mapbox.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl MapboxConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::from_secret(SecretString::new(access_token.into()))
    }

    pub fn from_secret(access_token: SecretString) -> Self {
        Self {
            access_token,
            base_url: "https://api.mapbox.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(super) fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Builds `{base_url}/{segments...}` with each segment percent-encoded.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, String> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| format!("invalid Mapbox base URL {}: {}", self.base_url, e))?;
        url.path_segments_mut()
            .map_err(|_| format!("Mapbox base URL cannot have a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(super) fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder().timeout(self.timeout).build()
    }
}

impl std::fmt::Debug for MapboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxConfig")
            .field("access_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
