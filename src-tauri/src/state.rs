//! Application state management
use vyking_core::{EventSender, SessionEvent};

/// Handle to the session loop, shared with IPC commands
pub struct AppState {
    events: EventSender,
}

impl AppState {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }

    pub fn dispatch(&self, event: SessionEvent) -> Result<(), String> {
        let name = event.name();
        if self.events.send(event) {
            Ok(())
        } else {
            Err(format!("Session stopped, {name} not delivered"))
        }
    }

    pub fn events(&self) -> &EventSender {
        &self.events
    }
}
