//! TripPlanner - owns the session's TripModel and keeps its distance and cost
//! in step with the user's selections.
//!
//! ## Start location
//!
//! An explicit start always wins. Without one, the device location is
//! sampled when a destination is confirmed and pinned on the model; later
//! device movement never alters it. Confirming a new destination samples
//! again; when that sample fails the previous captured start is dropped.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::{GeoPoint, Placemark};
use crate::domain::profile::Profile;
use crate::domain::trip::{StartOrigin, TransitMode, TripModel};
use crate::ports::{LocationProvider, PermissionStatus, RouteProvider, RoutingError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TripError {
    /// No explicit start and the device location could not be used.
    #[error("no start location: device location unavailable ({permission:?})")]
    NoStartLocation { permission: PermissionStatus },

    #[error("no destination selected")]
    NoDestination,

    #[error("distance lookup failed: {0}")]
    Routing(#[from] RoutingError),
}

pub struct TripPlanner {
    routes: Arc<dyn RouteProvider>,
    location: Arc<dyn LocationProvider>,
    model: TripModel,
}

impl TripPlanner {
    pub fn new(routes: Arc<dyn RouteProvider>, location: Arc<dyn LocationProvider>) -> Self {
        Self {
            routes,
            location,
            model: TripModel::new(),
        }
    }

    pub fn model(&self) -> &TripModel {
        &self.model
    }

    /// Sets a user-chosen start. Distance and cost are cleared until the
    /// next destination confirmation or mode change.
    pub fn set_start(&mut self, point: GeoPoint, name: Option<String>) {
        self.model.set_start(point, name);
    }

    /// Confirms `destination`, fetches the trip distance and prices it.
    ///
    /// Returns the cost in cents.
    pub async fn select_destination(
        &mut self,
        destination: &Placemark,
        profile: &Profile,
    ) -> Result<i64, TripError> {
        // Sample before touching the model.
        let device = if self.model.start_origin() == Some(StartOrigin::Explicit) {
            Ok(None)
        } else {
            self.sample_device().map(Some)
        };

        self.model
            .set_destination(destination.location(), destination.qualified_name());
        match device {
            Ok(Some(point)) => self.model.capture_start(point),
            Ok(None) => {}
            Err(e) => {
                self.model.release_captured_start();
                return Err(e);
            }
        }

        self.route_and_price(profile).await
    }

    /// Changes the travel mode, re-fetching distance when both ends are known.
    pub async fn set_transit_mode(
        &mut self,
        mode: TransitMode,
        profile: &Profile,
    ) -> Result<Option<i64>, TripError> {
        let changed = self.model.transit_mode() != Some(mode);
        self.model.set_transit_mode(mode);

        if changed && self.model.is_routable() {
            return self.route_and_price(profile).await.map(Some);
        }
        Ok(self.model.cost_cents())
    }

    /// Re-prices the current trip, e.g. after the profile's vehicle changed.
    pub fn refresh_cost(&mut self, profile: &Profile) -> Option<i64> {
        self.model.recompute_cost(profile)
    }

    /// Abandons destination entry; every field is cleared.
    pub fn cancel_destination(&mut self) {
        self.model.clear();
        tracing::debug!("Trip cleared");
    }

    fn sample_device(&self) -> Result<GeoPoint, TripError> {
        let permission = self.location.permission_status();
        match (permission, self.location.current_location()) {
            (PermissionStatus::Authorized, Some(point)) => Ok(point),
            _ => {
                tracing::warn!(?permission, "Device location unavailable for trip start");
                Err(TripError::NoStartLocation { permission })
            }
        }
    }

    async fn route_and_price(&mut self, profile: &Profile) -> Result<i64, TripError> {
        let destination = self
            .model
            .destination_location()
            .ok_or(TripError::NoDestination)?;
        let start = self.model.start_location().ok_or(TripError::NoStartLocation {
            permission: self.location.permission_status(),
        })?;
        let mode = match self.model.transit_mode() {
            Some(mode) => mode,
            None => {
                self.model.set_transit_mode(TransitMode::default());
                TransitMode::default()
            }
        };

        let distance = self
            .routes
            .distance_meters(start, destination, mode)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, %mode, "Distance lookup failed");
                e
            })?;
        self.model.set_distance(distance);

        let cost = self
            .model
            .recompute_cost(profile)
            .ok_or(TripError::NoDestination)?;
        tracing::debug!(distance_meters = distance, cost_cents = cost, %mode, "Trip priced");
        Ok(cost)
    }
}
