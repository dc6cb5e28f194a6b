use std::time::Duration;

use crate::location::{DefaultLocation, PositionRequest};

#[derive(Debug, Clone)]
/// Tunables for the location / dispatch workflow
pub struct WorkflowSettings {
    /// Where to center the map when the device can't be located
    pub default_location: DefaultLocation,
    /// Max time to wait for the device to report a fix
    pub location_timeout_ms: u32,
    /// Ask the device for its most accurate (GPS) fix
    pub high_accuracy: bool,
    /// Max age of a cached device fix we're willing to accept, 0 forces a fresh fix
    pub maximum_age_ms: u32,
    /// Time to wait after startup before first trying to locate the user, gives the map
    /// surface time to come up
    pub startup_delay_ms: u32,
}

impl WorkflowSettings {
    pub fn position_request(&self) -> PositionRequest {
        PositionRequest {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.location_timeout_ms.into()),
            maximum_age: Duration::from_millis(self.maximum_age_ms.into()),
        }
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms.into())
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            default_location: DefaultLocation::default(),
            location_timeout_ms: 10_000,
            high_accuracy: true,
            maximum_age_ms: 0,
            startup_delay_ms: 500,
        }
    }
}
