//! Vyking Core
//!
//! Session controller for the embedded try-on surface.
//! Rust owns the session state; the hosted page only receives attribute commands.

mod config;
mod controller;
mod error;
mod event;
mod session_loop;
mod surface;
mod view_mode;

#[cfg(test)]
mod testing;

pub use config::{Config, SurfaceConfig};
pub use controller::{Completion, SessionController, SessionPhase, SessionSnapshot};
pub use error::{CoreError, SurfaceError};
pub use event::{
    session_channel, EventReceiver, EventSender, SessionEvent, WeakEventSender,
};
pub use session_loop::SessionLoop;
pub use surface::{CommandTicket, RenderingSurface, SurfaceGeneration, SurfaceHost, SurfaceRequest};
pub use view_mode::ViewMode;

// Re-export component crates
pub use vyking_catalog::{Catalog, CatalogEntry, CatalogError};
pub use vyking_protocol::{ScriptPayload, TargetElement};
pub use vyking_trust::{TrustDecision, TrustFailure, TrustFailureKind, TrustPolicy, TrustResponder};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
