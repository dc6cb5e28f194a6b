mod location;
mod map;
mod state;

use ambulance_logic::WorkflowUiState;
use log::{LevelFilter, info};
use tauri::{Manager, State};
use tauri_specta::{ErrorHandlingMode, collect_commands, collect_events};

use std::result::Result as StdResult;

use crate::{
    map::MapUpdate,
    state::{AppStateHandle, ToastUpdate, WorkflowStateUpdate, create_workflow},
};

type Result<T = (), E = String> = StdResult<T, E>;

#[tauri::command]
#[specta::specta]
/// Get the current state of the workflow, call after receiving a [WorkflowStateUpdate]
async fn get_workflow_state(state: State<'_, AppStateHandle>) -> Result<WorkflowUiState> {
    Ok(state.get_ui_state().await)
}

#[tauri::command]
#[specta::specta]
/// Locate the user and draw the first map, call once the UI is listening for [MapUpdate]s.
/// Calling it again (e.g. after a reload) does nothing, read [WorkflowUiState] to redraw instead.
async fn start_workflow(state: State<'_, AppStateHandle>) -> Result {
    let workflow = state.inner().clone();
    tauri::async_runtime::spawn(async move {
        workflow.start().await;
    });
    Ok(())
}

#[tauri::command]
#[specta::specta]
/// Ask the dispatch service for the nearest ambulance. The outcome is shown to the user through
/// notifications and map updates, this only errors if a search can't be started right now.
async fn search_ambulance(state: State<'_, AppStateHandle>) -> Result {
    state
        .search()
        .await
        .map(|_| ())
        .map_err(|err| err.to_string())
}

#[tauri::command]
#[specta::specta]
/// Throw away the map and locate the user again
async fn refresh_location(state: State<'_, AppStateHandle>) -> Result {
    state
        .refresh_location()
        .await
        .map_err(|err| err.to_string())
}

#[tauri::command]
#[specta::specta]
/// Throw away the map and redraw it on the default location
async fn use_default_location(state: State<'_, AppStateHandle>) -> Result {
    state
        .use_default_location()
        .await
        .map_err(|err| err.to_string())
}

pub fn mk_specta() -> tauri_specta::Builder {
    tauri_specta::Builder::<tauri::Wry>::new()
        .error_handling(ErrorHandlingMode::Throw)
        .commands(collect_commands![
            get_workflow_state,
            start_workflow,
            search_ambulance,
            refresh_location,
            use_default_location,
        ])
        .events(collect_events![WorkflowStateUpdate, MapUpdate, ToastUpdate])
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let builder = mk_specta();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_notification::init())
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(LevelFilter::Debug)
                .build(),
        )
        .plugin(tauri_plugin_geolocation::init())
        .invoke_handler(builder.invoke_handler())
        .setup(move |app| {
            builder.mount_events(app);

            info!("Starting emergency dispatch client");

            let workflow = create_workflow(app.handle())?;
            app.manage(workflow);
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
