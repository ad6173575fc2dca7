//! Route provider port for trip distances.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::GeoPoint;
use crate::domain::trip::TransitMode;

/// Errors from routing providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("routing network error: {0}")]
    Network(String),

    #[error("no route found between the given points")]
    NoRoute,

    #[error("routing provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("routing response could not be read: {0}")]
    InvalidResponse(String),
}

/// Port for distance lookups. Route geometry is never requested.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Distance in meters of the provider's preferred route.
    async fn distance_meters(
        &self,
        start: GeoPoint,
        destination: GeoPoint,
        mode: TransitMode,
    ) -> Result<f64, RoutingError>;
}
