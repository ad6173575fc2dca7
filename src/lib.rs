//! Trip Offset - trip-session core for carbon-offset purchases.
//!
//! A session geocodes a destination, measures the trip, prices its carbon
//! offset and charges it through a payment backend, persisting a versioned
//! user profile along the way.
//!
//! # Architecture
//!
//! - **Domain**: value objects, the trip model, the cost engine and the
//!   profile schema
//! - **Ports**: traits for geocoding, routing, device location, byte storage
//!   and the payment gateway
//! - **Application**: geocoding session, trip planner, profile store and the
//!   charge handler
//! - **Adapters**: Mapbox and HTTP clients, file storage and test doubles

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
