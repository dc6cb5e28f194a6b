use std::sync::atomic::{AtomicU32, Ordering};

use ambulance_logic::{AmbulanceRecord, Coordinate, MapHandle, MapView, ResultOverlay, UserMarker};
use log::error;
use serde::Serialize;
use tauri::AppHandle;
use tauri_specta::Event;

#[derive(Serialize, Clone, Debug, specta::Type)]
#[serde(tag = "type")]
/// A drawing instruction for the webview map
pub enum MapCommand {
    /// Create the map, tiles and the user marker
    Render {
        handle: MapHandle,
        marker: UserMarker,
    },
    /// Replace the previous result layers with this one and fit the view to it
    ShowResult {
        handle: MapHandle,
        overlay: ResultOverlay,
    },
    /// Remove the map entirely
    Teardown { handle: MapHandle },
}

/// The map needs to be updated, contains what to draw
#[derive(Serialize, Clone, Debug, specta::Type, tauri_specta::Event)]
pub struct MapUpdate(MapCommand);

/// [MapView] that forwards everything to the Leaflet map in the webview as [MapUpdate] events
pub struct TauriMapView {
    app: AppHandle,
    next_handle: AtomicU32,
}

impl TauriMapView {
    pub fn new(app: AppHandle) -> Self {
        Self {
            app,
            next_handle: AtomicU32::new(0),
        }
    }

    fn emit(&self, cmd: MapCommand) {
        if let Err(why) = MapUpdate(cmd).emit(&self.app) {
            error!("Error sending map update to UI: {why:?}");
        }
    }
}

impl MapView for TauriMapView {
    fn render(&self, center: Coordinate, label: &str, is_device_location: bool) -> MapHandle {
        let handle = MapHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.emit(MapCommand::Render {
            handle,
            marker: UserMarker::describe(center, label, is_device_location),
        });
        handle
    }

    fn show_result(
        &self,
        handle: MapHandle,
        user: Coordinate,
        ambulance: &AmbulanceRecord,
        distance_km: Option<f64>,
    ) {
        self.emit(MapCommand::ShowResult {
            handle,
            overlay: ResultOverlay::describe(user, ambulance, distance_km),
        });
    }

    fn teardown(&self, handle: MapHandle) {
        self.emit(MapCommand::Teardown { handle });
    }
}
