//! Vyking WebView - Tauri Application
//!
//! - The toolbar webview is local UI only
//! - The try-on page runs in a child webview owned by the session loop
//! - Rust owns all session state

mod commands;
mod state;
mod surface;
mod trust;

use state::AppState;
use surface::TauriHost;
use tauri::webview::WebviewBuilder;
use tauri::window::WindowBuilder;
use tauri::{LogicalPosition, LogicalSize, Manager, WebviewUrl, WindowEvent};
use vyking_core::{session_channel, Config, SessionController, SessionEvent, SessionLoop};

const MAIN_WINDOW: &str = "main";

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging
    vyking_core::init_logging();

    tauri::Builder::default()
        .setup(|app| {
            let window = WindowBuilder::new(app, MAIN_WINDOW)
                .title("Vyking")
                .inner_size(1280.0, 800.0)
                .min_inner_size(480.0, 640.0)
                .center()
                .build()?;

            let ui_webview = WebviewBuilder::new(
                commands::ui_webview_label(MAIN_WINDOW),
                WebviewUrl::App("index.html".into()),
            )
            .auto_resize();

            let ui_webview = window.add_child(
                ui_webview,
                LogicalPosition::new(0.0, 0.0),
                LogicalSize::new(1280.0, 800.0),
            )?;
            let _ = ui_webview.show();

            // The surface stays absent until the toolbar reports camera permission
            let (events, receiver) = session_channel();
            let host = TauriHost::new(app.handle().clone(), MAIN_WINDOW);
            let controller = SessionController::new(Config::default(), host, events.clone())?;
            tauri::async_runtime::spawn(SessionLoop::new(controller, receiver).run());

            app.manage(AppState::new(events));

            tracing::info!("Vyking WebView started");

            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                if let Some(state) = window.app_handle().try_state::<AppState>() {
                    let _ = state.dispatch(SessionEvent::Shutdown);
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::session::permission_result,
            commands::session::toggle_view_mode,
            commands::session::advance_catalog,
            commands::session::clear_item,
            commands::session::get_session_status,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Vyking WebView");
}
