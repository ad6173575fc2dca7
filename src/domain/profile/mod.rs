//! Profile module - the persisted user profile and its on-disk schema.

mod entity;
mod schema;

pub use entity::Profile;
pub use schema::{decode, encode, SchemaError, CURRENT_SCHEMA_VERSION};
