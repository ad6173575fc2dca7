//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, error types and schema-evolution plumbing
//! that form the vocabulary of the trip-session domain.

mod errors;
mod geo;
mod upcaster;

pub use errors::ValidationError;
pub use geo::{GeoPoint, Placemark};
pub use upcaster::{UpcastError, Upcaster, UpcasterRegistry, VersionedRecord};
