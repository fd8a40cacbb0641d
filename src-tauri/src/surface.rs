//! Child webview surfaces
//!
//! The main window holds two webviews: the local toolbar UI underneath, and the
//! remote try-on page as a child on top of it, below the toolbar.
//! The session controller owns the child; this module only builds and tears it down.
//! Page loads, certificate failures and script completions go back onto the
//! session queue.

use tauri::webview::{PageLoadEvent, WebviewBuilder};
use tauri::{AppHandle, Emitter, LogicalPosition, LogicalSize, Manager, Webview, WebviewUrl};
use vyking_core::{
    CommandTicket, RenderingSurface, ScriptPayload, SessionEvent, SurfaceError, SurfaceHost,
    SurfaceRequest, WeakEventSender,
};

use crate::commands::ui_webview_label;
use crate::trust;

/// WebView2 arguments: Tauri's defaults plus gesture-free autoplay
#[cfg(windows)]
const AUTOPLAY_BROWSER_ARGS: &str = "--disable-features=msWebOOUI,msPdfOOUI,msSmartScreenProtection --autoplay-policy=no-user-gesture-required";

#[derive(Clone, Copy)]
pub struct ContentBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ContentBounds {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 56.0, // toolbar height
            width: 1280.0,
            height: 744.0,
        }
    }
}

/// Creates surfaces as child webviews of one window
pub struct TauriHost {
    app: AppHandle,
    window_label: String,
    bounds: ContentBounds,
}

impl TauriHost {
    pub fn new(app: AppHandle, window_label: impl Into<String>) -> Self {
        Self {
            app,
            window_label: window_label.into(),
            bounds: ContentBounds::default(),
        }
    }

    fn emit_to_ui(&self, event: &str, payload: &str) {
        let ui_label = ui_webview_label(&self.window_label);
        if let Err(e) = self.app.emit_to(ui_label.as_str(), event, payload) {
            tracing::warn!(event = %event, error = %e, "Failed to notify UI");
        }
    }
}

impl SurfaceHost for TauriHost {
    type Surface = TauriSurface;

    fn create_surface(&mut self, request: SurfaceRequest) -> Result<TauriSurface, SurfaceError> {
        let window = self
            .app
            .get_window(&self.window_label)
            .ok_or_else(|| SurfaceError::Create(format!("Window not found: {}", self.window_label)))?;

        let label = format!("surface-{}", request.generation);
        let blank = "about:blank"
            .parse::<url::Url>()
            .map_err(|e| SurfaceError::InvalidUrl(e.to_string()))?;

        let generation = request.generation;
        let events_for_load = request.events.clone();
        let config = request.config;

        let mut builder = WebviewBuilder::new(&label, WebviewUrl::External(blank))
            .auto_resize()
            .incognito(config.incognito)
            .on_page_load(move |_webview, payload| {
                if !matches!(payload.event(), PageLoadEvent::Finished) {
                    return;
                }

                // The initial about:blank must not receive commands
                let url = payload.url();
                if url.scheme() != "http" && url.scheme() != "https" {
                    return;
                }

                events_for_load.send(SessionEvent::LoadFinished {
                    generation,
                    url: url.to_string(),
                });
            });

        #[cfg(not(target_os = "macos"))]
        {
            builder = builder.transparent(config.transparent_background);
        }

        if !config.scripts_enabled {
            builder = builder.disable_javascript();
        }

        #[cfg(windows)]
        if config.autoplay_without_gesture {
            builder = builder.additional_browser_args(AUTOPLAY_BROWSER_ARGS);
        }

        let bounds = self.bounds;
        let webview = window
            .add_child(
                builder,
                LogicalPosition::new(bounds.x, bounds.y),
                LogicalSize::new(bounds.width, bounds.height),
            )
            .map_err(|e| SurfaceError::Create(e.to_string()))?;

        tracing::info!(label = %label, generation = %generation, "Attached child webview");

        if let Err(e) = trust::install(&webview, generation, request.events.clone()) {
            tracing::warn!(label = %label, error = %e, "Certificate failures not routed");
        }

        Ok(TauriSurface {
            label,
            webview,
            events: request.events,
        })
    }

    fn release_surface(&mut self, surface: TauriSurface) {
        match surface.webview.close() {
            Ok(()) => tracing::info!(label = %surface.label, "Closed child webview"),
            Err(e) => tracing::warn!(label = %surface.label, error = %e, "Failed to close child webview"),
        }
    }

    fn set_toggle_label(&mut self, label: &str) {
        self.emit_to_ui("toggle-label", label);
    }

    fn show_notice(&mut self, notice: &str) {
        self.emit_to_ui("session-notice", notice);
    }
}

pub struct TauriSurface {
    label: String,
    webview: Webview,
    /// Completions are posted back here
    events: WeakEventSender,
}

impl RenderingSurface for TauriSurface {
    fn navigate(&mut self, url: &url::Url) -> Result<(), SurfaceError> {
        self.webview
            .navigate(url.clone())
            .map_err(|e| SurfaceError::Navigate(e.to_string()))
    }

    fn evaluate(
        &mut self,
        payload: &ScriptPayload,
        ticket: Option<CommandTicket>,
    ) -> Result<(), SurfaceError> {
        let result = match ticket {
            Some(ticket) => {
                let events = self.events.clone();
                self.webview
                    .eval_with_callback(payload.as_str(), move |result| {
                        events.send(SessionEvent::ScriptCompleted { ticket, result });
                    })
            }
            None => self.webview.eval(payload.as_str()),
        };

        result.map_err(|e| SurfaceError::Evaluate(e.to_string()))
    }
}
