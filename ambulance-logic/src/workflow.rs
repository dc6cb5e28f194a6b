use chrono::{SecondsFormat, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    dispatch::{AmbulanceRecord, DispatchClient, DispatchResult},
    location::{Acquisition, Geolocator, LocationProvider, LocationResult},
    map::{DEVICE_LOCATION_LABEL, MapHandle, MapView, ResultOverlay, UserMarker},
    notice::{Notice, Notifier},
    settings::WorkflowSettings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, specta::Type)]
/// Where the workflow currently is
pub enum WorkflowState {
    /// Nothing has happened yet
    Uninitialized,
    /// Waiting on the device (or the default) location, no map yet
    LocatingUser,
    /// Map is drawn, user can search
    MapReady,
    /// A search request is in flight
    Searching,
    /// Map shows an assigned ambulance, user can search again
    ResultShown,
}

impl WorkflowState {
    pub fn search_enabled(&self) -> bool {
        matches!(self, Self::MapReady | Self::ResultShown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Search triggered before the map was initialized
    #[error("El mapa aún no está listo. Espera un momento.")]
    NotReady,
    #[error("Ya hay una búsqueda en curso")]
    SearchInProgress,
    /// Location is being resolved or a search is in flight
    #[error("Espera a que termine la operación en curso")]
    Busy,
}

#[derive(Debug, Clone, Serialize, specta::Type)]
/// Snapshot of the workflow for the UI
pub struct WorkflowUiState {
    pub state: WorkflowState,
    pub search_enabled: bool,
    pub location: Option<LocationResult>,
    pub ambulance: Option<AmbulanceRecord>,
    pub distance_km: Option<f64>,
    /// What the map should currently show for the user, lets a fresh page redraw it
    pub marker: Option<UserMarker>,
    /// What the map should currently show for the assigned ambulance
    pub overlay: Option<ResultOverlay>,
}

#[derive(Debug)]
/// Mutable state of a single session
struct Session {
    state: WorkflowState,
    location: Option<LocationResult>,
    map: Option<MapHandle>,
    marker: Option<UserMarker>,
    assigned: Option<(AmbulanceRecord, Option<f64>)>,
}

impl Session {
    fn new() -> Self {
        Self {
            state: WorkflowState::Uninitialized,
            location: None,
            map: None,
            marker: None,
            assigned: None,
        }
    }

    fn as_ui_state(&self) -> WorkflowUiState {
        let overlay = self
            .location
            .zip(self.assigned.as_ref())
            .map(|(loc, (amb, dist))| ResultOverlay::describe(loc.coordinate, amb, *dist));
        let (ambulance, distance_km) = self
            .assigned
            .clone()
            .map_or((None, None), |(amb, dist)| (Some(amb), dist));
        WorkflowUiState {
            state: self.state,
            search_enabled: self.state.search_enabled(),
            location: self.location,
            ambulance,
            distance_km,
            marker: self.marker.clone(),
            overlay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocateMode {
    Device,
    Default,
}

/// Drives a session: locates the user via [LocationProvider], draws on the [MapView], asks
/// the [DispatchClient] for ambulances and reports to the user through the [Notifier].
///
/// Every operation takes `&self`, the session is guarded internally. Collaborator futures are
/// never awaited while the session is locked, the [WorkflowState::LocatingUser] and
/// [WorkflowState::Searching] states keep a second operation from starting meanwhile.
pub struct Workflow<G: Geolocator, D: DispatchClient, M: MapView, N: Notifier> {
    session: Mutex<Session>,
    location: LocationProvider<G>,
    dispatch: D,
    map: M,
    notifier: N,
    settings: WorkflowSettings,
}

impl<G: Geolocator, D: DispatchClient, M: MapView, N: Notifier> Workflow<G, D, M, N> {
    pub fn new(
        settings: WorkflowSettings,
        geolocator: G,
        dispatch: D,
        map: M,
        notifier: N,
    ) -> Self {
        Self {
            session: Mutex::new(Session::new()),
            location: LocationProvider::new(geolocator, &settings),
            dispatch,
            map,
            notifier,
            settings,
        }
    }

    pub async fn get_ui_state(&self) -> WorkflowUiState {
        self.session.lock().await.as_ui_state()
    }

    pub async fn current_state(&self) -> WorkflowState {
        self.session.lock().await.state
    }

    #[cfg(test)]
    fn get_now() -> String {
        let fake = tokio::time::Instant::now();
        let real = std::time::Instant::now();
        (Utc::now() + fake.into_std().duration_since(real))
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    #[cfg(not(test))]
    fn get_now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn set_state(&self, session: &mut Session, state: WorkflowState) {
        debug!("Workflow {:?} -> {state:?}", session.state);
        session.state = state;
        self.notifier.send_update();
    }

    /// Wait for the startup delay then locate the user and draw the first map. Does nothing if
    /// the workflow was already started.
    pub async fn start(&self) {
        tokio::time::sleep(self.settings.startup_delay()).await;

        let session = self.session.lock().await;
        if session.state != WorkflowState::Uninitialized {
            warn!("Workflow already started, ignoring");
            return;
        }
        self.locate(session, LocateMode::Device).await;
    }

    /// Throw away the current map and locate the user again
    pub async fn refresh_location(&self) -> Result<(), WorkflowError> {
        let session = self.lock_idle().await?;
        info!("Refreshing location");
        self.locate(session, LocateMode::Device).await;
        Ok(())
    }

    /// Throw away the current map and redraw it on the default location without asking the
    /// device
    pub async fn use_default_location(&self) -> Result<(), WorkflowError> {
        let session = self.lock_idle().await?;
        info!("Switching to default location");
        self.locate(session, LocateMode::Default).await;
        Ok(())
    }

    /// Lock the session if it has a map and nothing is in flight
    async fn lock_idle(&self) -> Result<MutexGuard<'_, Session>, WorkflowError> {
        let session = self.session.lock().await;
        match session.state {
            WorkflowState::MapReady | WorkflowState::ResultShown => Ok(session),
            WorkflowState::Uninitialized
            | WorkflowState::LocatingUser
            | WorkflowState::Searching => {
                warn!("Can't relocate while {:?}", session.state);
                Err(WorkflowError::Busy)
            }
        }
    }

    async fn locate(&self, mut session: MutexGuard<'_, Session>, mode: LocateMode) {
        if let Some(handle) = session.map.take() {
            self.map.teardown(handle);
        }
        session.location = None;
        session.marker = None;
        session.assigned = None;
        self.set_state(&mut session, WorkflowState::LocatingUser);
        drop(session);

        let Acquisition { result, fallback } = match mode {
            LocateMode::Device => self.location.acquire().await,
            LocateMode::Default => Acquisition {
                result: self.location.default_location().as_result(),
                fallback: None,
            },
        };

        let place = self.location.default_location().name.clone();

        if let Some(reason) = fallback {
            info!("Using {place} instead ({:?})", reason.category());
            self.notifier.notify(Notice::LocationFallback {
                reason,
                place: place.clone(),
            });
        }

        let label = if result.is_device() {
            DEVICE_LOCATION_LABEL
        } else {
            place.as_str()
        };

        let mut session = self.session.lock().await;
        let handle = self
            .map
            .render(result.coordinate, label, result.is_device());
        session.map = Some(handle);
        session.marker = Some(UserMarker::describe(
            result.coordinate,
            label,
            result.is_device(),
        ));
        session.location = Some(result);
        self.set_state(&mut session, WorkflowState::MapReady);
    }

    /// Ask the dispatch service for the nearest ambulance to the session location and show
    /// the outcome. Only one search may be in flight at a time.
    pub async fn search(&self) -> Result<DispatchResult, WorkflowError> {
        let mut session = self.session.lock().await;

        let (origin, handle) = match (session.state, session.location, session.map) {
            (WorkflowState::MapReady | WorkflowState::ResultShown, Some(loc), Some(handle)) => {
                (loc.coordinate, handle)
            }
            (WorkflowState::Searching, _, _) => {
                warn!("Search requested while another is in flight, ignoring");
                return Err(WorkflowError::SearchInProgress);
            }
            (state, _, _) => {
                warn!("Search requested while {state:?}");
                self.notifier.notify(Notice::NotReady);
                return Err(WorkflowError::NotReady);
            }
        };

        // The map keeps showing the old result until a new one arrives, the snapshot doesn't
        session.assigned = None;
        self.set_state(&mut session, WorkflowState::Searching);
        drop(session);

        info!(
            "Searching for ambulance from {}, {}",
            origin.latitude(),
            origin.longitude()
        );

        let timestamp = Self::get_now();
        let result = self.dispatch.find_ambulance(origin, &timestamp).await;

        let mut session = self.session.lock().await;

        match &result {
            DispatchResult::Found {
                ambulance,
                distance_km,
            } => {
                info!("Ambulance {} assigned ({distance_km:?} km)", ambulance.id);
                self.map
                    .show_result(handle, origin, ambulance, *distance_km);
                session.assigned = Some((ambulance.clone(), *distance_km));
                self.set_state(&mut session, WorkflowState::ResultShown);
                self.notifier.notify(Notice::AmbulanceAssigned {
                    ambulance: ambulance.clone(),
                    distance_km: *distance_km,
                });
            }
            DispatchResult::NotFound { message } => {
                info!("No ambulance available: {message}");
                self.set_state(&mut session, WorkflowState::MapReady);
                self.notifier.notify(Notice::NoAmbulance {
                    message: message.clone(),
                });
            }
            DispatchResult::TransportError { message } => {
                warn!("Dispatch request failed: {message}");
                self.set_state(&mut session, WorkflowState::MapReady);
                self.notifier.notify(Notice::ConnectionFailed {
                    message: message.clone(),
                });
            }
        }

        Ok(result)
    }
}
