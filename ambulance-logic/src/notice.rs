use crate::{
    dispatch::AmbulanceRecord,
    location::{FailureCategory, LocationError},
    map::{format_degrees, format_distance, format_eta},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
/// Something the user needs to be told about
pub enum Notice {
    /// The device couldn't be located, contains why and the name of the place used instead
    LocationFallback { reason: LocationError, place: String },
    /// A search found an ambulance
    AmbulanceAssigned {
        ambulance: AmbulanceRecord,
        distance_km: Option<f64>,
    },
    /// The dispatch service has nothing for us
    NoAmbulance { message: String },
    /// The dispatch service couldn't be reached or answered garbage
    ConnectionFailed { message: String },
    /// An action was triggered before the map was ready
    NotReady,
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Self::AmbulanceAssigned { .. } => Severity::Success,
            Self::LocationFallback { .. } | Self::NoAmbulance { .. } | Self::NotReady => {
                Severity::Warning
            }
            Self::ConnectionFailed { .. } => Severity::Error,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::LocationFallback { reason, .. } => match reason.category() {
                FailureCategory::UnsupportedCapability => "Geolocalización no soportada",
                FailureCategory::PermissionOrTimeout => "Ubicación no disponible",
            },
            Self::AmbulanceAssigned { .. } => "¡Ambulancia en camino!",
            Self::NoAmbulance { .. } => "Sin ambulancia",
            Self::ConnectionFailed { .. } => "Error de conexión",
            Self::NotReady => "Mapa no listo",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::LocationFallback { reason, place } => {
                format!("{reason}\n\nSe usará ubicación por defecto: {place}")
            }
            Self::AmbulanceAssigned {
                ambulance,
                distance_km,
            } => format!(
                "Ambulancia #{}\nDistancia: {}\nTiempo estimado: {}\nUbicación actual: {}, {}\n\nLa ambulancia está en camino a tu ubicación.",
                ambulance.id,
                format_distance(*distance_km),
                format_eta(ambulance.eta_minutes),
                format_degrees(ambulance.coordinate.latitude()),
                format_degrees(ambulance.coordinate.longitude()),
            ),
            Self::NoAmbulance { message } => message.clone(),
            Self::ConnectionFailed { message } => format!(
                "{message}\n\nAsegúrate de que:\n1. El servidor esté corriendo\n2. La URL sea correcta\n3. No haya problemas de red"
            ),
            Self::NotReady => "El mapa aún no está listo. Espera un momento.".to_string(),
        }
    }
}

/// The UI surface the workflow reports to
pub trait Notifier: Send + Sync {
    /// Show `notice` to the user
    fn notify(&self, notice: Notice);
    /// Tell the UI the workflow state changed and it should re-read it
    fn send_update(&self);
}
