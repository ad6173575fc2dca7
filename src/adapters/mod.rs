//! Adapters - Implementations of port interfaces
//!
//! Production adapters talk to Mapbox, the payment backend and the local
//! filesystem. The remaining adapters are in-process doubles used by tests
//! and by hosts that supply their own data.

pub mod gateway;
pub mod geocoding;
pub mod location;
pub mod mapbox;
pub mod routing;
pub mod storage;
