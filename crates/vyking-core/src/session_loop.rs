//! Sequential session loop
//!
//! All controller work happens here, one event at a time. Surface callbacks,
//! UI commands and script completions only post onto the queue.

use crate::controller::SessionController;
use crate::event::{EventReceiver, SessionEvent};
use crate::surface::SurfaceHost;

pub struct SessionLoop<H: SurfaceHost> {
    controller: SessionController<H>,
    receiver: EventReceiver,
}

impl<H: SurfaceHost> SessionLoop<H> {
    pub fn new(controller: SessionController<H>, receiver: EventReceiver) -> Self {
        Self {
            controller,
            receiver,
        }
    }

    /// Run until `SessionEvent::Shutdown` or until every [`EventSender`] is gone.
    ///
    /// The controller and its surfaces only hold weak senders, so dropping the
    /// last external sender shuts the session down like an explicit `Shutdown`.
    ///
    /// [`EventSender`]: crate::EventSender
    pub async fn run(mut self) -> SessionController<H> {
        tracing::info!("Session loop started");

        loop {
            let Some(event) = self.receiver.recv().await else {
                tracing::debug!("Every sender dropped, shutting down");
                let _ = self.controller.handle(SessionEvent::Shutdown);
                break;
            };
            if self.controller.handle(event).is_break() {
                break;
            }
        }

        tracing::info!("Session loop stopped");
        self.controller
    }
}
