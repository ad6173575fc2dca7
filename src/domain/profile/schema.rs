//! Persisted profile format and its version history.
//!
//! # Versions
//!
//! - **v0** (no `schema_version` key): flat camelCase keys written by the
//!   first releases (`carMake`, `carModel`, `carYear`, `CO2GramsPerMile`,
//!   `stripeID`, `cumulativeCost`, `lastChargeAmount`, `totalOffsetHistory`).
//!   Any subset may be present.
//! - **v1**: nested `vehicle` object, snake_case keys, cents-suffixed counters.
//! - **v2** (current): v1 plus `total_offset_history_cents` and `saved_at`.
//!
//! Reading dispatches on the version tag and walks the upcaster chain. Writing
//! always produces the current version. From v1 onwards changes are additive
//! only; no key is ever reused with a different meaning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::foundation::{UpcastError, Upcaster, UpcasterRegistry, VersionedRecord};

use super::Profile;

/// Version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

const VERSION_KEY: &str = "schema_version";

/// Reasons a persisted profile could not be decoded.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("profile record is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("profile record is not a JSON object")]
    NotAnObject,

    #[error("invalid schema version tag: {0}")]
    InvalidVersion(String),

    #[error("profile upcast failed: {0}")]
    Upcast(#[from] UpcastError),
}

// ============================================
// Current record shape
// ============================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct VehicleRecord {
    #[serde(default)]
    make: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    emission_grams_per_mile: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProfileRecord {
    #[serde(default)]
    schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    vehicle: VehicleRecord,
    #[serde(default)]
    payment_identity: Option<String>,
    #[serde(default)]
    cumulative_cost_cents: i64,
    #[serde(default)]
    last_charge_cents: Option<i64>,
    #[serde(default)]
    total_offset_history_cents: Option<i64>,
}

impl ProfileRecord {
    fn from_profile(profile: &Profile, saved_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            saved_at: Some(saved_at),
            vehicle: VehicleRecord {
                make: profile.vehicle_make.clone(),
                model: profile.vehicle_model.clone(),
                year: profile.vehicle_year.clone(),
                emission_grams_per_mile: profile.emission_grams_per_mile,
            },
            payment_identity: profile.payment_identity.clone(),
            cumulative_cost_cents: profile.cumulative_cost_cents,
            last_charge_cents: profile.last_charge_cents,
            total_offset_history_cents: profile.total_offset_history_cents,
        }
    }

    fn into_profile(self) -> Profile {
        Profile {
            vehicle_make: self.vehicle.make,
            vehicle_model: self.vehicle.model,
            vehicle_year: self.vehicle.year,
            emission_grams_per_mile: self.vehicle.emission_grams_per_mile,
            payment_identity: self.payment_identity,
            cumulative_cost_cents: self.cumulative_cost_cents,
            last_charge_cents: self.last_charge_cents,
            total_offset_history_cents: self.total_offset_history_cents,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }
}

// ============================================
// Upcasters
// ============================================

/// v0 → v1: flat camelCase archive into the nested snake_case shape.
struct ProfileV0ToV1;

impl Upcaster for ProfileV0ToV1 {
    fn source_version(&self) -> u32 {
        0
    }

    fn upcast(&self, payload: JsonValue) -> Result<JsonValue, UpcastError> {
        let mut legacy = into_object(payload)?;
        let mut take = |key: &str| legacy.remove(key).unwrap_or(JsonValue::Null);

        let vehicle = json!({
            "make": take("carMake"),
            "model": take("carModel"),
            "year": take("carYear"),
            "emission_grams_per_mile": take("CO2GramsPerMile"),
        });
        let payment_identity = take("stripeID");
        let cumulative = counter_or_zero(take("cumulativeCost"));
        let last_charge = counter_or_zero(take("lastChargeAmount"));
        let total = take("totalOffsetHistory");

        let mut upgraded = Map::new();
        upgraded.insert(VERSION_KEY.to_string(), json!(1));
        upgraded.insert("vehicle".to_string(), vehicle);
        upgraded.insert("payment_identity".to_string(), payment_identity);
        upgraded.insert("cumulative_cost_cents".to_string(), cumulative);
        upgraded.insert("last_charge_cents".to_string(), last_charge);
        // v1 has no slot for the lifetime total; carry it so v1 → v2 keeps it.
        if !total.is_null() {
            upgraded.insert("total_offset_history_cents".to_string(), total);
        }
        for (key, value) in legacy {
            upgraded.entry(key).or_insert(value);
        }

        Ok(JsonValue::Object(upgraded))
    }
}

/// v1 → v2: adds the lifetime offset total.
struct ProfileV1ToV2;

impl Upcaster for ProfileV1ToV2 {
    fn source_version(&self) -> u32 {
        1
    }

    fn upcast(&self, payload: JsonValue) -> Result<JsonValue, UpcastError> {
        let mut object = into_object(payload)?;
        object
            .entry("total_offset_history_cents")
            .or_insert_with(|| json!(0));
        object.insert(VERSION_KEY.to_string(), json!(2));
        Ok(JsonValue::Object(object))
    }
}

fn into_object(payload: JsonValue) -> Result<Map<String, JsonValue>, UpcastError> {
    match payload {
        JsonValue::Object(map) => Ok(map),
        other => Err(UpcastError::UnexpectedShape(format!(
            "expected object, found {}",
            other
        ))),
    }
}

fn counter_or_zero(value: JsonValue) -> JsonValue {
    if value.is_null() {
        json!(0)
    } else {
        value
    }
}

fn registry() -> UpcasterRegistry {
    let mut registry = UpcasterRegistry::new(CURRENT_SCHEMA_VERSION);
    registry.register(Arc::new(ProfileV0ToV1));
    registry.register(Arc::new(ProfileV1ToV2));
    registry
}

// ============================================
// Codec
// ============================================

/// Decodes a persisted profile written under any known schema version.
pub fn decode(bytes: &[u8]) -> Result<Profile, SchemaError> {
    let value: JsonValue = serde_json::from_slice(bytes)?;
    let object = value.as_object().ok_or(SchemaError::NotAnObject)?;

    let version = match object.get(VERSION_KEY) {
        None => 0,
        Some(tag) => tag
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| SchemaError::InvalidVersion(tag.to_string()))?,
    };

    if version > CURRENT_SCHEMA_VERSION {
        tracing::warn!(
            schema_version = version,
            current = CURRENT_SCHEMA_VERSION,
            "Profile written by a newer release, reading known fields only"
        );
    }

    let record = registry().upcast_to_current(VersionedRecord::new(version, value))?;
    let record: ProfileRecord = serde_json::from_value(record.payload)?;

    tracing::debug!(
        source_version = version,
        saved_at = ?record.saved_at,
        "Decoded profile record"
    );
    Ok(record.into_profile())
}

/// Encodes a profile in the current schema version.
pub fn encode(profile: &Profile) -> Result<Vec<u8>, SchemaError> {
    encode_at(profile, Utc::now())
}

fn encode_at(profile: &Profile, saved_at: DateTime<Utc>) -> Result<Vec<u8>, SchemaError> {
    let record = ProfileRecord::from_profile(profile, saved_at);
    Ok(serde_json::to_vec(&record)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_profile() -> Profile {
        let mut profile = Profile::default();
        profile
            .set_vehicle(
                Some("Toyota".into()),
                Some("Prius".into()),
                Some("2017".into()),
                Some(186.4),
            )
            .unwrap();
        profile.set_payment_identity("cus_123");
        profile.record_charge(7).unwrap();
        profile.record_charge(3).unwrap();
        profile
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let profile = populated_profile();

        let decoded = decode(&encode(&profile).unwrap()).unwrap();

        assert_eq!(decoded, profile);
    }

    #[test]
    fn round_trip_preserves_absent_optionals() {
        let profile = Profile::default();

        let decoded = decode(&encode(&profile).unwrap()).unwrap();

        assert_eq!(decoded, profile);
        assert_eq!(decoded.last_charge_cents(), None);
        assert_eq!(decoded.emission_grams_per_mile(), None);
    }

    #[test]
    fn encode_writes_current_version_tag() {
        let bytes = encode(&Profile::default()).unwrap();
        let value: JsonValue = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value[VERSION_KEY], CURRENT_SCHEMA_VERSION);
        assert!(value["saved_at"].is_string());
    }

    #[test]
    fn decodes_untagged_legacy_archive() {
        let bytes = br#"{
            "carMake": "Ford",
            "carModel": "Focus",
            "carYear": "2012",
            "CO2GramsPerMile": 330.0,
            "stripeID": "cus_legacy",
            "cumulativeCost": 120,
            "lastChargeAmount": 20
        }"#;

        let profile = decode(bytes).unwrap();

        assert_eq!(profile.vehicle_make(), Some("Ford"));
        assert_eq!(profile.vehicle_model(), Some("Focus"));
        assert_eq!(profile.vehicle_year(), Some("2012"));
        assert_eq!(profile.emission_grams_per_mile(), Some(330.0));
        assert_eq!(profile.payment_identity(), Some("cus_legacy"));
        assert_eq!(profile.cumulative_cost_cents(), 120);
        assert_eq!(profile.last_charge_cents(), Some(20));
        assert_eq!(profile.total_offset_history_cents(), Some(0));
        assert_eq!(profile.schema_version(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn legacy_archive_keeps_lifetime_total() {
        let bytes = br#"{"carMake": "Ford", "totalOffsetHistory": 990}"#;

        let profile = decode(bytes).unwrap();

        assert_eq!(profile.total_offset_history_cents(), Some(990));
        assert_eq!(profile.cumulative_cost_cents(), 0);
        assert_eq!(profile.last_charge_cents(), Some(0));
        assert_eq!(profile.emission_grams_per_mile(), None);
    }

    #[test]
    fn decodes_v1_without_lifetime_total() {
        let bytes = br#"{
            "schema_version": 1,
            "vehicle": {"make": "Subaru", "model": "Outback", "year": "2019", "emission_grams_per_mile": 350.5},
            "payment_identity": "cus_v1",
            "cumulative_cost_cents": 45,
            "last_charge_cents": 5
        }"#;

        let profile = decode(bytes).unwrap();

        assert_eq!(profile.total_offset_history_cents(), Some(0));
        assert_eq!(profile.vehicle_make(), Some("Subaru"));
        assert_eq!(profile.emission_grams_per_mile(), Some(350.5));
        assert_eq!(profile.payment_identity(), Some("cus_v1"));
        assert_eq!(profile.cumulative_cost_cents(), 45);
        assert_eq!(profile.last_charge_cents(), Some(5));
    }

    #[test]
    fn newer_version_reads_known_fields() {
        let bytes = br#"{
            "schema_version": 5,
            "vehicle": {"make": "Kia"},
            "cumulative_cost_cents": 9,
            "total_offset_history_cents": 90,
            "loyalty_tier": "gold"
        }"#;

        let profile = decode(bytes).unwrap();

        assert_eq!(profile.vehicle_make(), Some("Kia"));
        assert_eq!(profile.cumulative_cost_cents(), 9);
        assert_eq!(profile.total_offset_history_cents(), Some(90));
    }

    #[test]
    fn rejects_truncated_stream() {
        let bytes = encode(&populated_profile()).unwrap();
        let truncated = &bytes[..bytes.len() / 2];

        assert!(matches!(decode(truncated), Err(SchemaError::Malformed(_))));
    }

    #[test]
    fn rejects_non_object_and_bad_tags() {
        assert!(matches!(decode(b"[1,2]"), Err(SchemaError::NotAnObject)));
        assert!(matches!(
            decode(br#"{"schema_version": "two"}"#),
            Err(SchemaError::InvalidVersion(_))
        ));
        assert!(decode(&[0xff, 0x00, 0x13]).is_err());
    }

    #[test]
    fn rejects_wrongly_typed_fields() {
        let bytes = br#"{"schema_version": 2, "cumulative_cost_cents": "lots"}"#;
        assert!(matches!(decode(bytes), Err(SchemaError::Malformed(_))));
    }

    #[test]
    fn encode_at_uses_given_timestamp() {
        let saved_at = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let bytes = encode_at(&Profile::default(), saved_at).unwrap();
        let value: JsonValue = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["saved_at"], "2024-03-01T12:00:00Z");
    }
}
