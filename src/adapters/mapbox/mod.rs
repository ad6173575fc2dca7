//! Mapbox adapters for geocoding and routing.
//!
//! Both adapters share one [`MapboxConfig`]; the access token is held as a
//! `SecretString` and only exposed when a request URL is built.

mod config;
mod directions;
mod geocoder;

pub use config::MapboxConfig;
pub use directions::MapboxDirections;
pub use geocoder::MapboxGeocoder;
