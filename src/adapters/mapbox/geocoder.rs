//! Mapbox Geocoder - Implementation of Geocoder for the Mapbox Places API.
//!
//! - Forward: `GET /geocoding/v5/mapbox.places/{query}.json?limit=&proximity=lon,lat`
//! - Reverse: `GET /geocoding/v5/mapbox.places/{lon},{lat}.json`
//!
//! Features map to placemarks through `place_name` and `center` (`[lon, lat]`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::foundation::{GeoPoint, Placemark};
use crate::domain::geocoding::GeocodeError;
use crate::ports::Geocoder;

use super::MapboxConfig;

/// Mapbox Places API client.
pub struct MapboxGeocoder {
    config: MapboxConfig,
    client: Client,
}

impl MapboxGeocoder {
    pub fn new(config: MapboxConfig) -> Result<Self, reqwest::Error> {
        let client = config.http_client()?;
        Ok(Self { config, client })
    }

    fn places_url(&self, search: &str) -> Result<reqwest::Url, GeocodeError> {
        self.config
            .endpoint(&["geocoding", "v5", "mapbox.places", &format!("{}.json", search)])
            .map_err(GeocodeError::network)
    }

    async fn fetch(
        &self,
        url: reqwest::Url,
        params: &[(&str, String)],
    ) -> Result<Vec<Placemark>, GeocodeError> {
        let response = self
            .client
            .get(url)
            .query(&[("access_token", self.config.access_token())])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodeError::Timeout
                } else {
                    GeocodeError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), error = %error_text, "Mapbox geocoding failed");
            return Err(GeocodeError::provider(status.as_u16(), error_text));
        }

        let body: PlacesResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::invalid_response(e.to_string()))?;

        Ok(body.into_placemarks())
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn forward_geocode(
        &self,
        query: &str,
        focal: Option<GeoPoint>,
        max_results: usize,
    ) -> Result<Vec<Placemark>, GeocodeError> {
        let url = self.places_url(query)?;

        let mut params = vec![("limit", max_results.to_string())];
        if let Some(focal) = focal {
            params.push((
                "proximity",
                format!("{},{}", focal.longitude(), focal.latitude()),
            ));
        }

        self.fetch(url, &params).await
    }

    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Vec<Placemark>, GeocodeError> {
        let url = self.places_url(&format!("{},{}", point.longitude(), point.latitude()))?;
        self.fetch(url, &[]).await
    }
}

// ============================================
// Mapbox API types
// ============================================

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    place_name: String,
    /// `[longitude, latitude]`
    center: [f64; 2],
}

impl PlacesResponse {
    fn into_placemarks(self) -> Vec<Placemark> {
        self.features
            .into_iter()
            .filter_map(|feature| {
                let [longitude, latitude] = feature.center;
                let placemark = GeoPoint::new(latitude, longitude)
                    .and_then(|point| Placemark::new(feature.place_name, point));
                match placemark {
                    Ok(placemark) => Some(placemark),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping malformed Mapbox feature");
                        None
                    }
                }
            })
            .collect()
    }
}
