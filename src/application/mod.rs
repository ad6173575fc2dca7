//! Application layer - session components and command handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Every collaborator is injected as an `Arc<dyn Port>`.
//!
//! - `GeocodingSession` - stale-safe forward/reverse lookups
//! - `TripPlanner` - trip model assembly, routing and pricing
//! - `ProfileStore` - serialized, fail-safe profile persistence
//! - `BoundedGateway` - timeout and cancellation around any gateway
//! - `OffsetChargeHandler` - customer authentication and offset charges

mod bounded_gateway;
mod geocoding_session;
mod offset_charge;
mod profile_store;
mod trip_planner;

pub use bounded_gateway::BoundedGateway;
pub use geocoding_session::{GeocodingSession, GeocodingSettings, QueryHandle};
pub use offset_charge::{
    ChargeOffsetCommand, ChargeOffsetError, ChargeOffsetResult, OffsetChargeHandler,
};
pub use profile_store::{ProfileStore, StoreError, DEFAULT_PROFILE_KEY};
pub use trip_planner::{TripError, TripPlanner};
