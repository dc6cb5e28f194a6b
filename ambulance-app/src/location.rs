use ambulance_logic::{DeviceFix, Geolocator, LocationError, PositionRequest};
use log::error;
use tauri::{AppHandle, async_runtime};
use tauri_plugin_geolocation::{Error as GeolocationError, GeolocationExt, PositionOptions};

pub struct TauriGeolocator(AppHandle);

impl TauriGeolocator {
    pub fn new(app: AppHandle) -> Self {
        Self(app)
    }
}

fn position_options(request: PositionRequest) -> PositionOptions {
    PositionOptions {
        enable_high_accuracy: request.high_accuracy,
        timeout: request.timeout.as_millis().try_into().unwrap_or(u32::MAX),
        maximum_age: request.maximum_age.as_millis().try_into().unwrap_or(u32::MAX),
    }
}

/// [GeolocationError] only has an `Io` variant and, on mobile, `PluginInvoke` wrapping the
/// native rejection, neither says what went wrong beyond the message
fn classify_error(why: GeolocationError) -> LocationError {
    LocationError::from_platform_message(why.to_string())
}

impl Geolocator for TauriGeolocator {
    fn is_supported(&self) -> bool {
        // The geolocation plugin only has real backends on mobile
        cfg!(mobile)
    }

    async fn current_position(&self, request: PositionRequest) -> Result<DeviceFix, LocationError> {
        let app = self.0.clone();
        let options = position_options(request);

        // Plugin call blocks until the OS answers
        let res = async_runtime::spawn_blocking(move || {
            app.geolocation().get_current_position(Some(options))
        })
        .await;

        match res {
            Ok(Ok(pos)) => {
                let coords = pos.coords;
                Ok(DeviceFix {
                    latitude: coords.latitude,
                    longitude: coords.longitude,
                    accuracy: coords.accuracy,
                })
            }
            Ok(Err(why)) => {
                error!("Failed to get location: {why:?}");
                Err(classify_error(why))
            }
            Err(why) => {
                error!("Location task failed: {why:?}");
                Err(LocationError::PositionUnavailable(why.to_string()))
            }
        }
    }
}
