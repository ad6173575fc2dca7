//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the trip-session core and the outside world. Adapters implement these
//! ports and are injected into the application components, so every
//! collaborator can be swapped for a test double.
//!
//! ## Lookup Ports
//!
//! - `Geocoder` - Forward and reverse geocoding
//! - `RouteProvider` - Trip distance between two points
//! - `LocationProvider` - Device location and permission status
//!
//! ## Persistence Ports
//!
//! - `ByteStore` - Keyed byte-stream persistence
//!
//! ## Payment Ports
//!
//! - `AuthGateway` - Payment backend authentication, charge and key issuance

mod auth_gateway;
mod byte_store;
mod geocoder;
mod location_provider;
mod route_provider;

pub use auth_gateway::{
    Authentication, AuthGateway, ChargeReceipt, ChargeRequest, GatewayError, GatewayErrorCode,
};
pub use byte_store::{ByteStore, StorageError};
pub use geocoder::Geocoder;
pub use location_provider::{LocationProvider, PermissionStatus};
pub use route_provider::{RouteProvider, RoutingError};

pub use crate::domain::geocoding::GeocodeError;
