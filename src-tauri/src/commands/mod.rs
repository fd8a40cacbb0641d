//! Tauri IPC Commands
//!
//! These commands forward toolbar actions onto the session queue.
//! The session loop owns all state; commands never touch the surface.

pub mod session;

use serde::Serialize;

pub fn ui_webview_label(window_label: &str) -> String {
    format!("ui-{window_label}")
}

#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl CommandResult<()> {
    pub fn from_dispatch(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::ok(()),
            Err(e) => Self::err(e),
        }
    }
}
