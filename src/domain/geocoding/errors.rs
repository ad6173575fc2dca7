//! Geocoding provider failures.

use thiserror::Error;

/// Why a geocoding lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// Transport failure before a response arrived.
    #[error("geocoding network error: {0}")]
    Network(String),

    /// Provider answered with a non-success status.
    #[error("geocoding provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    /// Provider answered with a body we could not interpret.
    #[error("geocoding response could not be read: {0}")]
    InvalidResponse(String),

    /// No answer within the lookup bound.
    #[error("geocoding lookup timed out")]
    Timeout,
}

impl GeocodeError {
    pub fn network(message: impl Into<String>) -> Self {
        GeocodeError::Network(message.into())
    }

    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        GeocodeError::Provider {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        GeocodeError::InvalidResponse(message.into())
    }
}
