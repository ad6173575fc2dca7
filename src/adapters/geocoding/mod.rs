//! Geocoding test doubles.

mod mock_geocoder;

pub use mock_geocoder::{MockGeocoder, RecordedLookup};
