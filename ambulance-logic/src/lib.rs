mod dispatch;
mod location;
mod map;
mod notice;
mod settings;
mod workflow;

pub use dispatch::{
    AmbulanceRecord, DEFAULT_AMBULANCE_STATUS, DEFAULT_NOT_FOUND_MESSAGE, DispatchClient,
    DispatchResult,
};
pub use location::{
    Acquisition, Coordinate, CoordinateError, DefaultLocation, DeviceFix, FailureCategory,
    Geolocator, LocationError, LocationProvider, LocationResult, LocationSource, PositionRequest,
};
pub use map::{
    AmbulanceMarker, Bounds, DEVICE_LOCATION_LABEL, MapHandle, MapView, Popup, PopupRow,
    ResultOverlay, UserMarker,
};
pub use notice::{Notice, Notifier, Severity};
pub use settings::WorkflowSettings;
pub use workflow::{Workflow, WorkflowError, WorkflowState, WorkflowUiState};

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
