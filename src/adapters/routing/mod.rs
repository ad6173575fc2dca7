//! Routing test doubles.

mod fixed_route_provider;

pub use fixed_route_provider::{FixedRouteProvider, RouteRequest};
