//! Session commands
use tauri::{AppHandle, Manager, State};
use vyking_core::{SessionEvent, SessionSnapshot};

use super::CommandResult;
use crate::state::AppState;

/// Reported by the toolbar once the camera permission prompt resolves
#[tauri::command]
pub fn permission_result(state: State<AppState>, granted: bool) -> CommandResult<()> {
    tracing::info!(granted, "Camera permission result");
    CommandResult::from_dispatch(state.dispatch(SessionEvent::PermissionResult { granted }))
}

#[tauri::command]
pub fn toggle_view_mode(state: State<AppState>) -> CommandResult<()> {
    CommandResult::from_dispatch(state.dispatch(SessionEvent::ToggleViewMode))
}

#[tauri::command]
pub fn advance_catalog(state: State<AppState>) -> CommandResult<()> {
    CommandResult::from_dispatch(state.dispatch(SessionEvent::AdvanceCatalog))
}

#[tauri::command]
pub fn clear_item(state: State<AppState>) -> CommandResult<()> {
    CommandResult::from_dispatch(state.dispatch(SessionEvent::ClearItem))
}

#[tauri::command]
pub async fn get_session_status(app: AppHandle) -> CommandResult<SessionSnapshot> {
    let events = match app.try_state::<AppState>() {
        Some(state) => state.events().clone(),
        None => return CommandResult::err("AppState not found".to_string()),
    };

    match events.snapshot().await {
        Some(snapshot) => CommandResult::ok(snapshot),
        None => CommandResult::err("Session stopped".to_string()),
    }
}
