//! Record upcaster infrastructure for schema evolution.
//!
//! Persisted records carry a schema version. Older records are transformed one
//! version step at a time until they reach the version this build writes.
//!
//! # Architecture
//!
//! - `Upcaster` trait - Transforms a single version step (v1 → v2)
//! - `UpcasterRegistry` - Chains upcasters to reach the current version
//! - `UpcastError` - Error types for failed transformations
//!
//! # Example
//!
//! ```ignore
//! struct ProfileV1ToV2;
//!
//! impl Upcaster for ProfileV1ToV2 {
//!     fn source_version(&self) -> u32 { 1 }
//!
//!     fn upcast(&self, mut payload: serde_json::Value) -> Result<serde_json::Value, UpcastError> {
//!         payload["total_offset_history_cents"] = 0.into();
//!         Ok(payload)
//!     }
//! }
//! ```

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

// ============================================
// Error Types
// ============================================

/// Errors that can occur during record upcasting.
#[derive(Debug, Error)]
pub enum UpcastError {
    /// The payload does not have the shape its version promises.
    #[error("unexpected record shape: {0}")]
    UnexpectedShape(String),

    /// No upcaster path exists from source to target version.
    #[error("incompatible version transition: v{from} → v{to}")]
    IncompatibleVersions { from: u32, to: u32 },
}

// ============================================
// Versioned Record
// ============================================

/// A persisted payload together with the schema version it was written under.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedRecord {
    pub schema_version: u32,
    pub payload: JsonValue,
}

impl VersionedRecord {
    pub fn new(schema_version: u32, payload: JsonValue) -> Self {
        Self {
            schema_version,
            payload,
        }
    }
}

// ============================================
// Upcaster Trait
// ============================================

/// Transforms a record from one schema version to the next.
///
/// # Implementation Notes
///
/// - Transformations MUST be deterministic (same input → same output)
/// - Keys the upcaster does not understand MUST be carried through untouched
/// - If transformation fails, return UpcastError (don't panic)
pub trait Upcaster: Send + Sync {
    /// Version this upcaster reads. It produces `source_version() + 1`.
    fn source_version(&self) -> u32;

    /// Transform the payload from the source schema to the next one.
    fn upcast(&self, payload: JsonValue) -> Result<JsonValue, UpcastError>;
}

// ============================================
// Upcaster Registry
// ============================================

/// Registry that chains upcasters up to a fixed current version.
pub struct UpcasterRegistry {
    /// Map from source version to upcaster.
    upcasters: HashMap<u32, Arc<dyn Upcaster>>,

    /// Version every record is brought up to.
    current_version: u32,
}

impl UpcasterRegistry {
    /// Creates an empty registry targeting `current_version`.
    pub fn new(current_version: u32) -> Self {
        Self {
            upcasters: HashMap::new(),
            current_version,
        }
    }

    /// Registers an upcaster for its version step.
    pub fn register(&mut self, upcaster: Arc<dyn Upcaster>) {
        self.upcasters.insert(upcaster.source_version(), upcaster);
    }

    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    /// Upcasts a record to the current version.
    ///
    /// Records already at (or past) the current version are returned as-is.
    pub fn upcast_to_current(
        &self,
        record: VersionedRecord,
    ) -> Result<VersionedRecord, UpcastError> {
        if record.schema_version >= self.current_version {
            return Ok(record);
        }

        let mut current = record;

        while current.schema_version < self.current_version {
            let upcaster = self
                .upcasters
                .get(&current.schema_version)
                .ok_or(UpcastError::IncompatibleVersions {
                    from: current.schema_version,
                    to: self.current_version,
                })?;

            current = VersionedRecord {
                schema_version: current.schema_version + 1,
                payload: upcaster.upcast(current.payload)?,
            };
        }

        Ok(current)
    }
}

// ============================================
// Tests
// ============================================
