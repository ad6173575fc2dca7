//! TripModel - the start/destination pair selected in a navigation session.
//!
//! The model is created empty per session, filled in by geocoding results and
//! user selection, and discarded when the session ends. It is never persisted.
//!
//! Invariant: `cost_cents` is present only while a destination and a distance
//! for the current start/destination/mode are present. Any change to those
//! inputs clears it until `recompute_cost` runs again.

use serde::Serialize;

use crate::domain::foundation::GeoPoint;
use crate::domain::profile::Profile;

use super::cost::offset_cost_cents;
use super::TransitMode;

/// Where the start location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOrigin {
    /// Chosen by the user.
    Explicit,
    /// Device location sampled when the destination was confirmed.
    DeviceCapture,
}

/// Currently selected trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TripModel {
    start_location: Option<GeoPoint>,
    start_name: Option<String>,
    start_origin: Option<StartOrigin>,
    destination_location: Option<GeoPoint>,
    destination_name: Option<String>,
    transit_mode: Option<TransitMode>,
    distance_meters: Option<f64>,
    cost_cents: Option<i64>,
}

impl TripModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════

    pub fn start_location(&self) -> Option<GeoPoint> {
        self.start_location
    }

    pub fn start_name(&self) -> Option<&str> {
        self.start_name.as_deref()
    }

    pub fn start_origin(&self) -> Option<StartOrigin> {
        self.start_origin
    }

    pub fn destination_location(&self) -> Option<GeoPoint> {
        self.destination_location
    }

    pub fn destination_name(&self) -> Option<&str> {
        self.destination_name.as_deref()
    }

    pub fn transit_mode(&self) -> Option<TransitMode> {
        self.transit_mode
    }

    pub fn distance_meters(&self) -> Option<f64> {
        self.distance_meters
    }

    pub fn cost_cents(&self) -> Option<i64> {
        self.cost_cents
    }

    /// True when both ends of the trip are known.
    pub fn is_routable(&self) -> bool {
        self.start_location.is_some() && self.destination_location.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Mutations
    // ════════════════════════════════════════════════════════════════════════

    /// Sets a user-chosen start.
    pub fn set_start(&mut self, point: GeoPoint, name: Option<String>) {
        self.start_location = Some(point);
        self.start_name = name;
        self.start_origin = Some(StartOrigin::Explicit);
        self.invalidate_route();
    }

    /// Pins the start to a device location sampled at confirmation time.
    ///
    /// Ignored when the user already chose a start explicitly.
    pub fn capture_start(&mut self, device_location: GeoPoint) {
        if self.start_origin == Some(StartOrigin::Explicit) {
            return;
        }
        self.start_location = Some(device_location);
        self.start_name = None;
        self.start_origin = Some(StartOrigin::DeviceCapture);
        self.invalidate_route();
    }

    /// Forgets a device-captured start. An explicit start is kept.
    pub fn release_captured_start(&mut self) {
        if self.start_origin != Some(StartOrigin::DeviceCapture) {
            return;
        }
        self.start_location = None;
        self.start_name = None;
        self.start_origin = None;
        self.invalidate_route();
    }

    /// Sets the destination; distance and cost must be recomputed.
    pub fn set_destination(&mut self, point: GeoPoint, name: impl Into<String>) {
        self.destination_location = Some(point);
        self.destination_name = Some(name.into());
        self.invalidate_route();
    }

    pub fn set_transit_mode(&mut self, mode: TransitMode) {
        if self.transit_mode == Some(mode) {
            return;
        }
        self.transit_mode = Some(mode);
        self.invalidate_route();
    }

    /// Records the routing provider's distance for the current start/destination.
    pub fn set_distance(&mut self, distance_meters: f64) {
        self.distance_meters = Some(distance_meters);
        self.cost_cents = None;
    }

    /// Prices the trip against the profile's emission rate.
    ///
    /// Leaves the cost empty when no destination or distance is known.
    pub fn recompute_cost(&mut self, profile: &Profile) -> Option<i64> {
        self.cost_cents = match (self.destination_location, self.distance_meters) {
            (Some(_), Some(distance)) => {
                Some(offset_cost_cents(distance, profile.emission_rate()))
            }
            _ => None,
        };
        self.cost_cents
    }

    /// Resets every field, used when the user abandons destination entry.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn invalidate_route(&mut self) {
        self.distance_meters = None;
        self.cost_cents = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn routed_model() -> TripModel {
        let mut model = TripModel::new();
        model.capture_start(point(42.0493, -87.6819));
        model.set_destination(point(41.8781, -87.6298), "Chicago, Illinois");
        model.set_distance(10_000.0);
        model
    }

    #[test]
    fn new_model_is_empty() {
        let model = TripModel::new();
        assert!(model.is_empty());
        assert!(!model.is_routable());
        assert_eq!(model.cost_cents(), None);
    }

    #[test]
    fn recompute_uses_profile_rate() {
        let mut model = routed_model();
        let mut profile = Profile::default();
        profile
            .set_vehicle(None, None, None, Some(375.3))
            .unwrap();

        assert_eq!(model.recompute_cost(&profile), Some(3));
        assert_eq!(model.cost_cents(), Some(3));
    }

    #[test]
    fn recompute_without_distance_leaves_cost_empty() {
        let mut model = TripModel::new();
        model.set_destination(point(41.8781, -87.6298), "Chicago");

        assert_eq!(model.recompute_cost(&Profile::default()), None);
    }

    #[test]
    fn new_destination_clears_distance_and_cost() {
        let mut model = routed_model();
        model.recompute_cost(&Profile::default());

        model.set_destination(point(40.0, -88.0), "Champaign");

        assert_eq!(model.distance_meters(), None);
        assert_eq!(model.cost_cents(), None);
    }

    #[test]
    fn new_distance_clears_stale_cost() {
        let mut model = routed_model();
        model.recompute_cost(&Profile::default());

        model.set_distance(20_000.0);

        assert_eq!(model.cost_cents(), None);
    }

    #[test]
    fn changing_transit_mode_invalidates_route() {
        let mut model = routed_model();
        model.set_transit_mode(TransitMode::Driving);
        model.set_distance(10_000.0);

        model.set_transit_mode(TransitMode::Driving);
        assert_eq!(model.distance_meters(), Some(10_000.0));

        model.set_transit_mode(TransitMode::Walking);
        assert_eq!(model.distance_meters(), None);
    }

    #[test]
    fn capture_does_not_override_explicit_start() {
        let mut model = TripModel::new();
        model.set_start(point(1.0, 1.0), Some("Home".to_string()));

        model.capture_start(point(2.0, 2.0));

        assert_eq!(model.start_location(), Some(point(1.0, 1.0)));
        assert_eq!(model.start_name(), Some("Home"));
        assert_eq!(model.start_origin(), Some(StartOrigin::Explicit));
    }

    #[test]
    fn release_captured_start_leaves_model_unroutable() {
        let mut model = routed_model();

        model.release_captured_start();

        assert_eq!(model.start_location(), None);
        assert_eq!(model.start_origin(), None);
        assert!(!model.is_routable());
        assert_eq!(model.distance_meters(), None);
        assert_eq!(model.destination_name(), Some("Chicago, Illinois"));
    }

    #[test]
    fn release_captured_start_keeps_explicit_start() {
        let mut model = TripModel::new();
        model.set_start(point(1.0, 1.0), Some("Home".to_string()));

        model.release_captured_start();

        assert_eq!(model.start_location(), Some(point(1.0, 1.0)));
        assert_eq!(model.start_origin(), Some(StartOrigin::Explicit));
    }

    #[test]
    fn clear_resets_everything() {
        let mut model = routed_model();
        model.set_transit_mode(TransitMode::Cycling);

        model.clear();

        assert!(model.is_empty());
    }
}
