use serde::Serialize;

use crate::{dispatch::AmbulanceRecord, location::Coordinate};

/// Radius of the circle drawn around a device fix
pub const ACCURACY_RADIUS_METERS: f64 = 100.0;
/// Zoom level the map opens at
pub const INITIAL_ZOOM: u8 = 15;
/// Padding around the user / ambulance pair when framing a result
pub const FIT_PADDING_PX: u16 = 50;

/// Label of the user marker when the location came from the device
pub const DEVICE_LOCATION_LABEL: &str = "Tu ubicación actual";
/// Tooltip of the map control that brings the view back to the user
pub const LOCATE_CONTROL_TITLE: &str = "Mostrar mi ubicación";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, specta::Type)]
/// Identifies one rendered map, invalid after [MapView::teardown]
pub struct MapHandle(pub u32);

/// The rendering surface the workflow draws on
pub trait MapView: Send + Sync {
    /// Draw the base map centered on `center` with a marker labelled `label`, plus an accuracy
    /// circle if this is a device location.
    fn render(&self, center: Coordinate, label: &str, is_device_location: bool) -> MapHandle;
    /// Replace any previous result with `ambulance`, connect it to the user and frame both.
    /// The user marker is never touched.
    fn show_result(
        &self,
        handle: MapHandle,
        user: Coordinate,
        ambulance: &AmbulanceRecord,
        distance_km: Option<f64>,
    );
    /// Release everything drawn under `handle`
    fn teardown(&self, handle: MapHandle);
}

#[derive(Debug, Clone, PartialEq, Serialize, specta::Type)]
pub struct PopupRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, specta::Type)]
/// Structured contents of a marker popup, the view decides how to lay it out
pub struct Popup {
    pub title: String,
    pub rows: Vec<PopupRow>,
}

impl Popup {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::with_capacity(5),
        }
    }

    fn row(mut self, label: &str, value: impl Into<String>) -> Self {
        self.rows.push(PopupRow {
            label: label.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}

pub fn format_degrees(component: f64) -> String {
    format!("{component:.6}")
}

pub fn format_distance(distance_km: Option<f64>) -> String {
    distance_km
        .map(|d| format!("{d:.2} km"))
        .unwrap_or_else(|| "Calculando...".to_string())
}

pub fn format_eta(eta_minutes: Option<f64>) -> String {
    match eta_minutes {
        Some(m) if m.fract() == 0.0 => format!("{m:.0} minutos"),
        Some(m) => format!("{m} minutos"),
        None => "8-10 minutos".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, specta::Type)]
/// Axis aligned box in degrees
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    pub fn around(a: Coordinate, b: Coordinate) -> Self {
        let corner = |lat: f64, lon: f64| {
            Coordinate::new(lat, lon).expect("min/max of valid coordinates is valid")
        };
        Self {
            south_west: corner(
                a.latitude().min(b.latitude()),
                a.longitude().min(b.longitude()),
            ),
            north_east: corner(
                a.latitude().max(b.latitude()),
                a.longitude().max(b.longitude()),
            ),
        }
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        (self.south_west.latitude()..=self.north_east.latitude()).contains(&point.latitude())
            && (self.south_west.longitude()..=self.north_east.longitude())
                .contains(&point.longitude())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, specta::Type)]
/// What to draw for the user's own location
pub struct UserMarker {
    pub coordinate: Coordinate,
    pub popup: Popup,
    /// Only present for device locations
    pub accuracy_radius_m: Option<f64>,
    pub zoom: u8,
    /// Title of the control that re-centers the map on this marker
    pub locate_title: String,
}

impl UserMarker {
    pub fn describe(center: Coordinate, label: &str, is_device_location: bool) -> Self {
        let popup = Popup::new(label)
            .row("Lat", format_degrees(center.latitude()))
            .row("Lon", format_degrees(center.longitude()));
        Self {
            coordinate: center,
            popup,
            accuracy_radius_m: is_device_location.then_some(ACCURACY_RADIUS_METERS),
            zoom: INITIAL_ZOOM,
            locate_title: LOCATE_CONTROL_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, specta::Type)]
pub struct AmbulanceMarker {
    pub coordinate: Coordinate,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq, Serialize, specta::Type)]
/// Everything drawn for a search result
pub struct ResultOverlay {
    pub ambulance: AmbulanceMarker,
    /// User first, then ambulance
    pub route: [Coordinate; 2],
    pub bounds: Bounds,
    pub padding_px: u16,
}

impl ResultOverlay {
    pub fn describe(user: Coordinate, ambulance: &AmbulanceRecord, distance_km: Option<f64>) -> Self {
        let popup = Popup::new(format!("Ambulancia #{}", ambulance.id))
            .row("Estado", ambulance.status.clone())
            .row("Distancia", format_distance(distance_km))
            .row("Tiempo estimado", format_eta(ambulance.eta_minutes))
            .row("Lat", format_degrees(ambulance.coordinate.latitude()))
            .row("Lon", format_degrees(ambulance.coordinate.longitude()));
        Self {
            ambulance: AmbulanceMarker {
                coordinate: ambulance.coordinate,
                popup,
            },
            route: [user, ambulance.coordinate],
            bounds: Bounds::around(user, ambulance.coordinate),
            padding_px: FIT_PADDING_PX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::test;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).expect("Invalid test coordinate")
    }

    fn ambulance() -> AmbulanceRecord {
        AmbulanceRecord {
            id: "A1".to_string(),
            coordinate: coord(19.41, -99.11),
            status: "En camino".to_string(),
            eta_minutes: Some(7.0),
        }
    }

    #[test]
    async fn test_user_marker_accuracy_circle() {
        let device = UserMarker::describe(coord(19.4, -99.1), DEVICE_LOCATION_LABEL, true);
        assert_eq!(device.accuracy_radius_m, Some(100.0));
        assert_eq!(device.popup.title, "Tu ubicación actual");
        assert_eq!(device.popup.value("Lat"), Some("19.400000"));
        assert_eq!(device.popup.value("Lon"), Some("-99.100000"));

        let fallback = UserMarker::describe(coord(23.175, -102.8669), "Fresnillo, Zacatecas", false);
        assert_eq!(fallback.accuracy_radius_m, None);
        assert_eq!(fallback.zoom, INITIAL_ZOOM);
        assert_eq!(fallback.locate_title, "Mostrar mi ubicación");
    }

    #[test]
    async fn test_result_overlay() {
        let user = coord(19.4, -99.1);
        let overlay = ResultOverlay::describe(user, &ambulance(), Some(1.2));

        assert_eq!(overlay.ambulance.popup.title, "Ambulancia #A1");
        assert_eq!(overlay.ambulance.popup.value("Distancia"), Some("1.20 km"));
        assert_eq!(overlay.ambulance.popup.value("Tiempo estimado"), Some("7 minutos"));
        assert_eq!(overlay.ambulance.popup.value("Estado"), Some("En camino"));
        assert_eq!(overlay.route, [user, coord(19.41, -99.11)]);
        assert!(overlay.bounds.contains(user));
        assert!(overlay.bounds.contains(overlay.ambulance.coordinate));
        assert_eq!(overlay.padding_px, 50);
    }

    #[test]
    async fn test_missing_distance_and_eta() {
        let mut amb = ambulance();
        amb.eta_minutes = None;
        let overlay = ResultOverlay::describe(coord(0.0, 0.0), &amb, None);

        assert_eq!(
            overlay.ambulance.popup.value("Distancia"),
            Some("Calculando...")
        );
        assert_eq!(
            overlay.ambulance.popup.value("Tiempo estimado"),
            Some("8-10 minutos")
        );
    }

    #[test]
    async fn test_bounds_order() {
        let bounds = Bounds::around(coord(10.0, 20.0), coord(-5.0, 30.0));
        assert_eq!(bounds.south_west, coord(-5.0, 20.0));
        assert_eq!(bounds.north_east, coord(10.0, 30.0));
        assert!(!bounds.contains(coord(11.0, 25.0)));
    }

    #[test]
    async fn test_fractional_eta() {
        assert_eq!(format_eta(Some(7.5)), "7.5 minutos");
    }
}
