use std::{future::Future, time::Duration};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::WorkflowSettings;

/// A "part" of a coordinate
pub type CoordinateComponent = f64;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(CoordinateComponent),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(CoordinateComponent),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, specta::Type)]
/// A validated point on the globe, in degrees
pub struct Coordinate {
    latitude: CoordinateComponent,
    longitude: CoordinateComponent,
}

impl Coordinate {
    pub fn new(
        latitude: CoordinateComponent,
        longitude: CoordinateComponent,
    ) -> Result<Self, CoordinateError> {
        // Written as negated range checks so NaN is rejected too
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> CoordinateComponent {
        self.latitude
    }

    pub fn longitude(&self) -> CoordinateComponent {
        self.longitude
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, specta::Type)]
/// Where a [LocationResult] came from
pub enum LocationSource {
    /// A fix reported by the device
    Device,
    /// The fixed fallback location
    Default,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, specta::Type)]
/// The resolved location for this session
pub struct LocationResult {
    pub coordinate: Coordinate,
    pub source: LocationSource,
    /// Accuracy radius reported by the device, only present for [LocationSource::Device]
    pub accuracy_meters: Option<f64>,
}

impl LocationResult {
    pub fn is_device(&self) -> bool {
        self.source == LocationSource::Device
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Location used whenever the device can't give us one
pub struct DefaultLocation {
    pub coordinate: Coordinate,
    /// Human readable place name, shown as the map label
    pub name: String,
}

impl DefaultLocation {
    pub const LATITUDE: CoordinateComponent = 23.1750;
    pub const LONGITUDE: CoordinateComponent = -102.8669;

    pub fn as_result(&self) -> LocationResult {
        LocationResult {
            coordinate: self.coordinate,
            source: LocationSource::Default,
            accuracy_meters: None,
        }
    }
}

impl Default for DefaultLocation {
    fn default() -> Self {
        Self {
            coordinate: Coordinate {
                latitude: Self::LATITUDE,
                longitude: Self::LONGITUDE,
            },
            name: "Fresnillo, Zacatecas".to_string(),
        }
    }
}

/// Which of the error classes a failure to locate the user falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    UnsupportedCapability,
    PermissionOrTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Este dispositivo no soporta geolocalización")]
    Unsupported,
    #[error("Permiso de ubicación denegado")]
    PermissionDenied,
    #[error("No se pudo determinar la ubicación: {0}")]
    PositionUnavailable(String),
    #[error("Se agotó el tiempo de espera para obtener la ubicación")]
    Timeout,
}

impl LocationError {
    /// Sort a free-form platform error into a [LocationError].
    ///
    /// The mobile geolocation plugins only hand back the native message: Android and iOS
    /// report a refused permission prompt with "denied" or "permission" in it, and a fix that
    /// didn't arrive in time with "timeout" or "timed out". Anything else is passed through.
    pub fn from_platform_message(message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("denied") || lower.contains("permission") {
            Self::PermissionDenied
        } else if lower.contains("timeout") || lower.contains("timed out") {
            Self::Timeout
        } else {
            Self::PositionUnavailable(message)
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Unsupported => FailureCategory::UnsupportedCapability,
            Self::PermissionDenied | Self::PositionUnavailable(_) | Self::Timeout => {
                FailureCategory::PermissionOrTimeout
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Options handed to the device when asking for a fix
pub struct PositionRequest {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// How old a cached fix may be, zero means always take a fresh one
    pub maximum_age: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Raw fix as reported by the device, not yet validated
pub struct DeviceFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters
    pub accuracy: f64,
}

/// Device geolocation capability
pub trait Geolocator: Send + Sync {
    /// Whether the runtime has any way of locating the device
    fn is_supported(&self) -> bool {
        true
    }

    /// Ask the device for a single fix
    fn current_position(
        &self,
        request: PositionRequest,
    ) -> impl Future<Output = Result<DeviceFix, LocationError>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
/// Outcome of [LocationProvider::acquire], if the default location was used because the
/// device failed `fallback` holds why.
pub struct Acquisition {
    pub result: LocationResult,
    pub fallback: Option<LocationError>,
}

/// Resolves the user's location, falling back to [DefaultLocation] on any failure
pub struct LocationProvider<G: Geolocator> {
    geolocator: G,
    request: PositionRequest,
    default: DefaultLocation,
}

impl<G: Geolocator> LocationProvider<G> {
    pub fn new(geolocator: G, settings: &WorkflowSettings) -> Self {
        Self {
            geolocator,
            request: settings.position_request(),
            default: settings.default_location.clone(),
        }
    }

    pub fn default_location(&self) -> &DefaultLocation {
        &self.default
    }

    async fn locate_device(&self) -> Result<LocationResult, LocationError> {
        if !self.geolocator.is_supported() {
            return Err(LocationError::Unsupported);
        }

        // The device is asked to respect the timeout too, but we don't trust it to
        let fix = tokio::time::timeout(
            self.request.timeout,
            self.geolocator.current_position(self.request),
        )
        .await
        .map_err(|_| LocationError::Timeout)??;

        let coordinate = Coordinate::new(fix.latitude, fix.longitude)
            .map_err(|why| LocationError::PositionUnavailable(why.to_string()))?;

        Ok(LocationResult {
            coordinate,
            source: LocationSource::Device,
            accuracy_meters: Some(fix.accuracy),
        })
    }

    /// Get the device location, or the default location if that fails for any reason
    pub async fn acquire(&self) -> Acquisition {
        match self.locate_device().await {
            Ok(result) => {
                info!(
                    "Got device location: {}, {} (accuracy {:?}m)",
                    result.coordinate.latitude(),
                    result.coordinate.longitude(),
                    result.accuracy_meters
                );
                Acquisition {
                    result,
                    fallback: None,
                }
            }
            Err(why) => {
                warn!(
                    "Couldn't locate device ({why:?}), using default location {}",
                    self.default.name
                );
                Acquisition {
                    result: self.default.as_result(),
                    fallback: Some(why),
                }
            }
        }
    }
}
