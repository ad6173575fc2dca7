//! Route provider that answers every request with a configured distance.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::GeoPoint;
use crate::domain::trip::TransitMode;
use crate::ports::{RouteProvider, RoutingError};

/// Recorded routing request for assertions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub start: GeoPoint,
    pub destination: GeoPoint,
    pub mode: TransitMode,
}

/// Fixed-distance route provider for testing.
pub struct FixedRouteProvider {
    answer: Mutex<Result<f64, RoutingError>>,
    requests: Mutex<Vec<RouteRequest>>,
}

impl FixedRouteProvider {
    pub fn new(distance_meters: f64) -> Self {
        Self {
            answer: Mutex::new(Ok(distance_meters)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: RoutingError) -> Self {
        Self {
            answer: Mutex::new(Err(error)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_distance(&self, distance_meters: f64) {
        *self.answer.lock().unwrap() = Ok(distance_meters);
    }

    pub fn set_error(&self, error: RoutingError) {
        *self.answer.lock().unwrap() = Err(error);
    }

    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteProvider for FixedRouteProvider {
    async fn distance_meters(
        &self,
        start: GeoPoint,
        destination: GeoPoint,
        mode: TransitMode,
    ) -> Result<f64, RoutingError> {
        self.requests.lock().unwrap().push(RouteRequest {
            start,
            destination,
            mode,
        });
        self.answer.lock().unwrap().clone()
    }
}
