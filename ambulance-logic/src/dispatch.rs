use std::future::Future;

use serde::Serialize;

use crate::location::Coordinate;

/// Status shown for an ambulance when the dispatch service doesn't send one
pub const DEFAULT_AMBULANCE_STATUS: &str = "En camino";

/// Message shown when the dispatch service has no ambulance and doesn't say why
pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "No se pudo encontrar ambulancia";

#[derive(Debug, Clone, Serialize, PartialEq, specta::Type)]
/// An ambulance assigned by the dispatch service
pub struct AmbulanceRecord {
    pub id: String,
    pub coordinate: Coordinate,
    pub status: String,
    pub eta_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
/// Outcome of a single search
pub enum DispatchResult {
    /// An ambulance was assigned, distance is in kilometers if the service computed it
    Found {
        ambulance: AmbulanceRecord,
        distance_km: Option<f64>,
    },
    /// The service answered but has no ambulance for us
    NotFound { message: String },
    /// The request never got a usable answer
    TransportError { message: String },
}

impl DispatchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Something that can ask the dispatch service for the nearest ambulance
pub trait DispatchClient: Send + Sync {
    /// Perform a single search from `origin`, `timestamp` is an RFC 3339 UTC time of the
    /// request. Never fails, failures are reported as [DispatchResult::TransportError].
    fn find_ambulance(
        &self,
        origin: Coordinate,
        timestamp: &str,
    ) -> impl Future<Output = DispatchResult> + Send;
}
