//! Domain layer containing trip-session business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (geo values, errors, upcasting)
//! - `geocoding` - Lookup queries, outcomes and stale-result tracking
//! - `trip` - The selected trip and its offset price
//! - `profile` - The persisted user profile and its schema history

pub mod foundation;
pub mod geocoding;
pub mod profile;
pub mod trip;
