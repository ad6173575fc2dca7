//! Device location port.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::GeoPoint;

/// Location permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    NotDetermined,
    Denied,
    Restricted,
    Authorized,
}

impl PermissionStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, PermissionStatus::Authorized)
    }
}

/// Port for the device's last known location.
///
/// Reads are synchronous snapshots; the platform keeps them fresh.
pub trait LocationProvider: Send + Sync {
    /// Last known device location, if any fix has been obtained.
    fn current_location(&self) -> Option<GeoPoint>;

    fn permission_status(&self) -> PermissionStatus;
}
