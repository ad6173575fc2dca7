//! Mapbox Directions - Implementation of RouteProvider.
//!
//! `GET /directions/v5/mapbox/{profile}/{lon},{lat};{lon},{lat}?overview=false`
//! and reads the first route's `distance` in meters.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::foundation::GeoPoint;
use crate::domain::trip::TransitMode;
use crate::ports::{RouteProvider, RoutingError};

use super::MapboxConfig;

/// Mapbox Directions API client.
pub struct MapboxDirections {
    config: MapboxConfig,
    client: Client,
}

impl MapboxDirections {
    pub fn new(config: MapboxConfig) -> Result<Self, reqwest::Error> {
        let client = config.http_client()?;
        Ok(Self { config, client })
    }

    fn route_url(
        &self,
        start: GeoPoint,
        destination: GeoPoint,
        mode: TransitMode,
    ) -> Result<reqwest::Url, RoutingError> {
        let coordinates = format!(
            "{},{};{},{}",
            start.longitude(),
            start.latitude(),
            destination.longitude(),
            destination.latitude()
        );
        self.config
            .endpoint(&["directions", "v5", "mapbox", mode.as_str(), &coordinates])
            .map_err(RoutingError::Network)
    }
}

#[async_trait]
impl RouteProvider for MapboxDirections {
    async fn distance_meters(
        &self,
        start: GeoPoint,
        destination: GeoPoint,
        mode: TransitMode,
    ) -> Result<f64, RoutingError> {
        let url = self.route_url(start, destination, mode)?;

        let response = self
            .client
            .get(url)
            .query(&[
                ("overview", "false"),
                ("access_token", self.config.access_token()),
            ])
            .send()
            .await
            .map_err(|e| RoutingError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), error = %error_text, "Mapbox directions failed");
            return Err(RoutingError::Provider {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| RoutingError::InvalidResponse(e.to_string()))?;

        body.first_distance()
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    distance: f64,
}

impl DirectionsResponse {
    fn first_distance(self) -> Result<f64, RoutingError> {
        if matches!(self.code.as_deref(), Some(code) if code != "Ok") {
            return Err(RoutingError::NoRoute);
        }
        match self.routes.first() {
            Some(route) if route.distance.is_finite() && route.distance >= 0.0 => {
                Ok(route.distance)
            }
            Some(route) => Err(RoutingError::InvalidResponse(format!(
                "invalid route distance {}",
                route.distance
            ))),
            None => Err(RoutingError::NoRoute),
        }
    }
}
