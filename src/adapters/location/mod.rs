//! Device location adapters.

mod static_location;

pub use static_location::StaticLocationProvider;
