//! Geographic value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::out_of_range("latitude", -90.0, 90.0, latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::out_of_range(
                "longitude",
                -180.0,
                180.0,
                longitude,
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A named real-world location returned by a geocoding lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placemark {
    qualified_name: String,
    location: GeoPoint,
}

impl Placemark {
    /// Creates a placemark. The name must contain something other than whitespace.
    pub fn new(qualified_name: impl Into<String>, location: GeoPoint) -> Result<Self, ValidationError> {
        let qualified_name = qualified_name.into();
        if qualified_name.trim().is_empty() {
            return Err(ValidationError::empty_field("qualified_name"));
        }
        Ok(Self {
            qualified_name,
            location,
        })
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }
}
