//! Session events and the sequential queue they travel on

use tokio::sync::{mpsc, oneshot};
use vyking_trust::{TrustFailure, TrustResponder};

use crate::controller::SessionSnapshot;
use crate::surface::{CommandTicket, SurfaceGeneration};

pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

pub enum SessionEvent {
    /// Result of the camera permission request
    PermissionResult { granted: bool },
    ToggleViewMode,
    AdvanceCatalog,
    ClearItem,
    /// A surface finished loading a page
    LoadFinished {
        generation: SurfaceGeneration,
        url: String,
    },
    /// A surface hit a certificate failure and waits for a decision
    TrustFailure {
        generation: SurfaceGeneration,
        failure: TrustFailure,
        responder: Box<dyn TrustResponder>,
    },
    /// A script submitted with a ticket has been evaluated
    ScriptCompleted {
        ticket: CommandTicket,
        result: String,
    },
    Snapshot(oneshot::Sender<SessionSnapshot>),
    /// Release the surface and stop the session loop
    Shutdown,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::PermissionResult { .. } => "permission_result",
            SessionEvent::ToggleViewMode => "toggle_view_mode",
            SessionEvent::AdvanceCatalog => "advance_catalog",
            SessionEvent::ClearItem => "clear_item",
            SessionEvent::LoadFinished { .. } => "load_finished",
            SessionEvent::TrustFailure { .. } => "trust_failure",
            SessionEvent::ScriptCompleted { .. } => "script_completed",
            SessionEvent::Snapshot(_) => "snapshot",
            SessionEvent::Shutdown => "shutdown",
        }
    }
}

impl std::fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Cloneable handle for posting onto the session queue
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSender {
    /// Post an event; returns false once the session loop has stopped
    pub fn send(&self, event: SessionEvent) -> bool {
        let name = event.name();
        match self.tx.send(event) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(event = name, "Session loop stopped, event dropped");
                false
            }
        }
    }

    /// Ask the session loop for its current state
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (reply, response) = oneshot::channel();
        if !self.send(SessionEvent::Snapshot(reply)) {
            return None;
        }
        response.await.ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// A handle that does not keep the session loop alive
    pub fn downgrade(&self) -> WeakEventSender {
        WeakEventSender {
            tx: self.tx.downgrade(),
        }
    }
}

/// Non-owning handle held by the controller and its surfaces.
///
/// The queue closes once every [`EventSender`] is dropped, whatever number of
/// these are still around.
#[derive(Clone)]
pub struct WeakEventSender {
    tx: mpsc::WeakUnboundedSender<SessionEvent>,
}

impl WeakEventSender {
    /// Post an event; returns false once the queue has closed
    pub fn send(&self, event: SessionEvent) -> bool {
        let name = event.name();
        match self.tx.upgrade() {
            Some(tx) => tx.send(event).is_ok(),
            None => {
                tracing::debug!(event = name, "Session queue closed, event dropped");
                false
            }
        }
    }
}

/// Create the session queue
pub fn session_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}
