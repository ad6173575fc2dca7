//! Payment backend adapters.
//!
//! - **HttpAuthGateway** - JSON over HTTP against the offset backend
//! - **MockAuthGateway** - Configurable double for tests

mod http_gateway;
mod mock_gateway;

pub use http_gateway::{HttpAuthGateway, HttpGatewayConfig};
pub use mock_gateway::{GatewayCall, MockAuthGateway};
