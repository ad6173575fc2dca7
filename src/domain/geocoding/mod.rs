//! Geocoding module - lookup queries, their outcomes and stale-result tracking.
//!
//! # Module Structure
//!
//! - `query` - Query identity and payloads
//! - `outcome` - Terminal outcomes reported to the caller
//! - `tracker` - Id-based supersession bookkeeping
//! - `errors` - Provider failures

mod errors;
mod outcome;
mod query;
mod tracker;

pub use errors::GeocodeError;
pub use outcome::GeocodeOutcome;
pub use query::{GeocodeQuery, QueryId, QueryKind, QueryPayload};
pub use tracker::QueryTracker;
