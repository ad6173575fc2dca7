//! TransitMode enum - how the trip will be travelled.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Travel mode used when asking the routing provider for a distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitMode {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl TransitMode {
    /// Returns all transit modes.
    pub fn all() -> &'static [TransitMode] {
        &[TransitMode::Driving, TransitMode::Walking, TransitMode::Cycling]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitMode::Driving => "driving",
            TransitMode::Walking => "walking",
            TransitMode::Cycling => "cycling",
        }
    }
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
