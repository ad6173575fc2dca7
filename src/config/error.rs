//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid URL for {0}: must be http or https")]
    InvalidUrl(&'static str),

    #[error("Invalid timeout for {0}: must be between 1 and 120 seconds")]
    InvalidTimeout(&'static str),

    #[error("Invalid geocoding max_results: must be between 1 and 10")]
    InvalidMaxResults,

    #[error("Profile key must not be empty")]
    EmptyProfileKey,

    #[error("Invalid currency code: must be three ASCII letters")]
    InvalidCurrency,
}

/// Shared timeout bound for every section.
pub(super) fn check_timeout(section: &'static str, secs: u64) -> Result<(), ValidationError> {
    if secs == 0 || secs > 120 {
        return Err(ValidationError::InvalidTimeout(section));
    }
    Ok(())
}

pub(super) fn check_url(section: &'static str, url: &str) -> Result<(), ValidationError> {
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(ValidationError::InvalidUrl(section)),
    }
}
