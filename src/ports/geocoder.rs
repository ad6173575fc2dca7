//! Geocoder port for forward and reverse place lookups.

use async_trait::async_trait;

use crate::domain::foundation::{GeoPoint, Placemark};
use crate::domain::geocoding::GeocodeError;

/// Port for geocoding providers (e.g., Mapbox).
///
/// Each call is an independent request. Callers cancel a lookup by dropping
/// its future.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves free text to candidate places, best match first.
    ///
    /// `focal` biases results towards a point when given.
    async fn forward_geocode(
        &self,
        query: &str,
        focal: Option<GeoPoint>,
        max_results: usize,
    ) -> Result<Vec<Placemark>, GeocodeError>;

    /// Resolves a coordinate to named places, canonical name first.
    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Vec<Placemark>, GeocodeError>;
}
