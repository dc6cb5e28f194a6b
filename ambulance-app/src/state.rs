use std::sync::Arc;

use ambulance_logic::{Notice, Notifier, Severity, Workflow as BaseWorkflow, WorkflowSettings};
use ambulance_transport::HttpDispatchClient;
use anyhow::Context;
use log::{error, info};
use serde::{Deserialize, Serialize};
use tauri::AppHandle;
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tauri_plugin_notification::NotificationExt;
use tauri_specta::Event;

use crate::{location::TauriGeolocator, map::TauriMapView};

/// The state of the workflow has changed
#[derive(Serialize, Deserialize, Clone, Default, Debug, specta::Type, tauri_specta::Event)]
pub struct WorkflowStateUpdate;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, specta::Type)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

impl From<Severity> for ToastKind {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Success => Self::Success,
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Error,
        }
    }
}

/// A dismissible in-page notification should be shown
#[derive(Serialize, Deserialize, Clone, Debug, specta::Type, tauri_specta::Event)]
pub struct ToastUpdate {
    kind: ToastKind,
    title: String,
    body: String,
}

/// Reports [Notice]s through native dialogs, and for good news also through an in-page toast
/// and a system notification
pub struct TauriNotifier(AppHandle);

impl TauriNotifier {
    pub fn new(app: &AppHandle) -> Self {
        Self(app.clone())
    }

    fn dialog(&self, title: &str, body: &str, kind: MessageDialogKind) {
        self.0
            .dialog()
            .message(body)
            .title(title)
            .kind(kind)
            .show(|_| {});
    }

    fn toast(&self, kind: ToastKind, title: &str, body: &str) {
        let toast = ToastUpdate {
            kind,
            title: title.to_string(),
            body: body.to_string(),
        };
        if let Err(why) = toast.emit(&self.0) {
            error!("Error sending toast to UI: {why:?}");
        }
    }
}

impl Notifier for TauriNotifier {
    fn notify(&self, notice: Notice) {
        let title = notice.title();
        let body = notice.body();
        let severity = notice.severity();

        info!("Notifying user ({severity:?}): {title}");

        match severity {
            Severity::Success => {
                self.toast(severity.into(), title, &body);
                if let Err(why) = self.0.notification().builder().title(title).body(&body).show()
                {
                    error!("Error showing system notification: {why:?}");
                }
                self.dialog(title, &body, MessageDialogKind::Info);
            }
            Severity::Warning => self.dialog(title, &body, MessageDialogKind::Warning),
            Severity::Error => self.dialog(title, &body, MessageDialogKind::Error),
        }
    }

    fn send_update(&self) {
        if let Err(why) = WorkflowStateUpdate.emit(&self.0) {
            error!("Error sending workflow state update to UI: {why:?}");
        }
    }
}

pub type Workflow = BaseWorkflow<TauriGeolocator, HttpDispatchClient, TauriMapView, TauriNotifier>;

pub type AppStateHandle = Arc<Workflow>;

pub fn create_workflow(app: &AppHandle) -> anyhow::Result<AppStateHandle> {
    let dispatch = HttpDispatchClient::new().context("Failed to set up dispatch client")?;
    let workflow = Workflow::new(
        WorkflowSettings::default(),
        TauriGeolocator::new(app.clone()),
        dispatch,
        TauriMapView::new(app.clone()),
        TauriNotifier::new(app),
    );
    Ok(Arc::new(workflow))
}
