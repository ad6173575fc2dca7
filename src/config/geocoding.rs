//! Geocoding configuration (Mapbox)

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::{check_timeout, check_url, ValidationError};
use crate::adapters::mapbox::MapboxConfig;
use crate::application::GeocodingSettings;

/// Geocoding configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    /// Mapbox access token. Without one only injected geocoders can be used.
    pub mapbox_access_token: Option<SecretString>,

    /// Mapbox API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on forward-geocode candidates
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Seconds before an unanswered lookup resolves as failed
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            mapbox_access_token: None,
            base_url: default_base_url(),
            max_results: default_max_results(),
            lookup_timeout_secs: default_lookup_timeout(),
        }
    }
}

impl GeocodingConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    /// Session settings derived from this section.
    pub fn session_settings(&self) -> GeocodingSettings {
        GeocodingSettings::default()
            .with_lookup_timeout(self.lookup_timeout())
            .with_max_results(self.max_results)
    }

    /// Mapbox client settings, when a token is configured.
    pub fn mapbox(&self) -> Option<MapboxConfig> {
        self.mapbox_access_token.as_ref().map(|token| {
            MapboxConfig::from_secret(token.clone())
                .with_base_url(self.base_url.clone())
                .with_timeout(self.lookup_timeout())
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_url("geocoding", &self.base_url)?;
        check_timeout("geocoding", self.lookup_timeout_secs)?;
        if !(1..=10).contains(&self.max_results) {
            return Err(ValidationError::InvalidMaxResults);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.mapbox.com".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_lookup_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeocodingConfig::default();
        assert!(config.mapbox_access_token.is_none());
        assert_eq!(config.max_results, 10);
        assert_eq!(config.lookup_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_results_bounds() {
        for max_results in [0, 11] {
            let config = GeocodingConfig {
                max_results,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidMaxResults));
        }
    }

    #[test]
    fn test_mapbox_requires_token() {
        assert!(GeocodingConfig::default().mapbox().is_none());

        let config = GeocodingConfig {
            mapbox_access_token: Some(SecretString::new("pk.test".to_string())),
            base_url: "http://localhost:9000".to_string(),
            ..Default::default()
        };
        let mapbox = config.mapbox().unwrap();

        assert_eq!(mapbox.base_url, "http://localhost:9000");
        assert_eq!(mapbox.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_session_settings_follow_config() {
        let config = GeocodingConfig {
            max_results: 5,
            lookup_timeout_secs: 3,
            ..Default::default()
        };

        let settings = config.session_settings();

        assert_eq!(settings.max_results, 5);
        assert_eq!(settings.lookup_timeout, Duration::from_secs(3));
    }
}
