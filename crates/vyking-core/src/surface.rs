//! Rendering surface seam
//!
//! The controller never talks to a webview directly. A [`SurfaceHost`] creates and
//! releases surfaces and shows the controller's UI outputs; a [`RenderingSurface`]
//! loads pages and evaluates scripts. Both report back only by posting
//! [`SessionEvent`](crate::SessionEvent)s on the sender they were handed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use vyking_protocol::ScriptPayload;

use crate::config::SurfaceConfig;
use crate::error::SurfaceError;
use crate::event::WeakEventSender;

/// Identifies one surface instance; strictly increasing over a session
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct SurfaceGeneration(u64);

impl SurfaceGeneration {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SurfaceGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlates a script completion with the continuation waiting for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandTicket {
    pub id: u64,
    pub generation: SurfaceGeneration,
}

/// Everything a host needs to build a surface
pub struct SurfaceRequest {
    pub generation: SurfaceGeneration,
    pub config: SurfaceConfig,
    /// Where the surface posts load, trust and completion events
    pub events: WeakEventSender,
}

pub trait RenderingSurface: Send {
    /// Start loading `url`; completion arrives as `SessionEvent::LoadFinished`
    fn navigate(&mut self, url: &Url) -> Result<(), SurfaceError>;

    /// Submit a script without waiting for it.
    ///
    /// With a ticket, the surface posts `SessionEvent::ScriptCompleted` carrying
    /// that ticket and the evaluation result once the page has run the script.
    fn evaluate(
        &mut self,
        payload: &ScriptPayload,
        ticket: Option<CommandTicket>,
    ) -> Result<(), SurfaceError>;
}

pub trait SurfaceHost: Send {
    type Surface: RenderingSurface;

    /// Create, configure and attach a surface, installing its event handlers
    fn create_surface(&mut self, request: SurfaceRequest) -> Result<Self::Surface, SurfaceError>;

    /// Detach the surface from its container and free it
    fn release_surface(&mut self, surface: Self::Surface);

    fn set_toggle_label(&mut self, label: &str);

    fn show_notice(&mut self, notice: &str);
}

/// The surface currently owned by the controller
pub(crate) struct LiveSurface<S> {
    pub generation: SurfaceGeneration,
    pub created_at: DateTime<Utc>,
    pub surface: S,
}

impl<S> LiveSurface<S> {
    pub fn new(generation: SurfaceGeneration, surface: S) -> Self {
        Self {
            generation,
            created_at: Utc::now(),
            surface,
        }
    }
}
