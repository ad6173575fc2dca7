//! Settable device location.
//!
//! Backs the location port for tests and for hosts that push location fixes
//! into the core instead of letting it poll the platform.

use std::sync::RwLock;

use crate::domain::foundation::GeoPoint;
use crate::ports::{LocationProvider, PermissionStatus};

#[derive(Debug)]
pub struct StaticLocationProvider {
    state: RwLock<(Option<GeoPoint>, PermissionStatus)>,
}

impl StaticLocationProvider {
    pub fn new(location: Option<GeoPoint>, permission: PermissionStatus) -> Self {
        Self {
            state: RwLock::new((location, permission)),
        }
    }

    /// Authorized provider with a known fix.
    pub fn authorized_at(location: GeoPoint) -> Self {
        Self::new(Some(location), PermissionStatus::Authorized)
    }

    pub fn set_location(&self, location: Option<GeoPoint>) {
        self.write().0 = location;
    }

    pub fn set_permission(&self, permission: PermissionStatus) {
        self.write().1 = permission;
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, (Option<GeoPoint>, PermissionStatus)> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> (Option<GeoPoint>, PermissionStatus) {
        *self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocationProvider for StaticLocationProvider {
    fn current_location(&self) -> Option<GeoPoint> {
        self.read().0
    }

    fn permission_status(&self) -> PermissionStatus {
        self.read().1
    }
}
