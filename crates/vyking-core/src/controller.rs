//! Session controller
//!
//! ```text
//! Inactive --permission granted--> Active
//!                                    | toggle: release surface,
//!                                    | recreate for the new mode
//!                                    v
//!                                  Active
//! ```
//!
//! The controller owns the single live surface. Every failure stops here:
//! surface errors are logged, certificate failures are classified, stale
//! events from released surfaces are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::ControlFlow;
use vyking_catalog::{Catalog, CatalogEntry};
use vyking_protocol::{
    build_configure_command, build_remove_item_command, build_replace_item_command, ScriptPayload,
};
use vyking_trust::{TrustFailure, TrustPolicy, TrustResponder};

use crate::config::Config;
use crate::event::{EventSender, SessionEvent, WeakEventSender};
use crate::surface::{
    CommandTicket, LiveSurface, RenderingSurface, SurfaceGeneration, SurfaceHost, SurfaceRequest,
};
use crate::view_mode::ViewMode;
use crate::Result;

/// Continuation run with the script's result
pub type Completion = Box<dyn FnOnce(String) + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No permission yet, no surface
    Inactive,
    /// Surface requested; it may still be loading or have failed to start
    Active,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub view_mode: ViewMode,
    pub toggle_label: String,
    pub phase: SessionPhase,
    pub cursor: usize,
    pub current_item: CatalogEntry,
    pub surface_generation: Option<SurfaceGeneration>,
    pub surface_created_at: Option<DateTime<Utc>>,
}

struct SessionState<S> {
    view_mode: ViewMode,
    catalog: Catalog,
    phase: SessionPhase,
    surface: Option<LiveSurface<S>>,
}

struct PendingCommand {
    generation: SurfaceGeneration,
    completion: Completion,
}

pub struct SessionController<H: SurfaceHost> {
    config: Config,
    host: H,
    /// Handed to every new surface; never keeps the queue open
    events: WeakEventSender,
    trust_policy: TrustPolicy,
    state: SessionState<H::Surface>,
    /// Continuations keyed by ticket id
    pending: HashMap<u64, PendingCommand>,
    last_generation: SurfaceGeneration,
    last_command_id: u64,
}

impl<H: SurfaceHost> SessionController<H> {
    pub fn new(config: Config, host: H, events: EventSender) -> Result<Self> {
        config.validate()?;
        let catalog = config.build_catalog()?;

        let state = SessionState {
            view_mode: config.initial_view_mode,
            catalog,
            phase: SessionPhase::Inactive,
            surface: None,
        };

        Ok(Self {
            config,
            host,
            events: events.downgrade(),
            trust_policy: TrustPolicy::new(),
            state,
            pending: HashMap::new(),
            last_generation: SurfaceGeneration::default(),
            last_command_id: 0,
        })
    }

    /// Handle one event from the session queue
    pub fn handle(&mut self, event: SessionEvent) -> ControlFlow<()> {
        tracing::trace!(event = event.name(), "Handling session event");

        match event {
            SessionEvent::PermissionResult { granted: true } => self.on_permission_granted(),
            SessionEvent::PermissionResult { granted: false } => self.on_permission_denied(),
            SessionEvent::ToggleViewMode => self.on_toggle_view_mode(),
            SessionEvent::AdvanceCatalog => self.on_advance_catalog(),
            SessionEvent::ClearItem => self.on_clear_item(),
            SessionEvent::LoadFinished { generation, url } => {
                self.on_load_finished(generation, &url)
            }
            SessionEvent::TrustFailure {
                generation,
                failure,
                responder,
            } => self.on_trust_error(generation, &failure, responder),
            SessionEvent::ScriptCompleted { ticket, result } => {
                self.on_script_completed(ticket, result)
            }
            SessionEvent::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            SessionEvent::Shutdown => {
                self.release_surface();
                self.state.phase = SessionPhase::Inactive;
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    pub fn on_permission_granted(&mut self) {
        if self.state.phase == SessionPhase::Active {
            tracing::debug!("Permission granted while already active, ignoring");
            return;
        }

        tracing::info!(mode = %self.state.view_mode, "Camera permission granted");
        self.activate();
    }

    pub fn on_permission_denied(&mut self) {
        tracing::warn!("Camera permission denied");
        self.host.show_notice(&self.config.permission_notice);
    }

    pub fn on_load_finished(&mut self, generation: SurfaceGeneration, url: &str) {
        if !self.is_live(generation) {
            tracing::debug!(generation = %generation, url = %url, "Ignoring load from released surface");
            return;
        }

        tracing::info!(generation = %generation, url = %url, "Page load finished");

        let configure =
            build_configure_command(&self.config.integration_key, &self.config.config_locator);
        self.submit(
            configure,
            Some(Box::new(|result| {
                tracing::debug!(result = %result, "Configure command completed");
            })),
        );

        let entry = self.state.catalog.current();
        let replace = build_replace_item_command(&entry.asset_locator, &entry.display_name);
        self.submit(replace, None);
    }

    pub fn on_trust_error(
        &mut self,
        generation: SurfaceGeneration,
        failure: &TrustFailure,
        responder: Box<dyn TrustResponder>,
    ) {
        if !self.is_live(generation) {
            tracing::debug!(generation = %generation, host = %failure.host, "Cancelling trust failure from released surface");
            responder.cancel();
            return;
        }

        self.trust_policy.evaluate_failure(failure).apply(responder);
    }

    pub fn on_advance_catalog(&mut self) {
        let entry = self.state.catalog.advance();
        let replace = build_replace_item_command(&entry.asset_locator, &entry.display_name);
        let locator = entry.asset_locator.clone();

        tracing::info!(
            cursor = self.state.catalog.cursor(),
            item = %self.state.catalog.current().display_name,
            "Advanced catalog"
        );

        self.submit(
            replace,
            Some(Box::new(move |_| {
                tracing::debug!(asset = %locator, "Item replaced");
            })),
        );
    }

    pub fn on_clear_item(&mut self) {
        self.submit(build_remove_item_command(), None);
    }

    pub fn on_toggle_view_mode(&mut self) {
        self.state.view_mode = self.state.view_mode.toggled();
        tracing::info!(mode = %self.state.view_mode, "View mode toggled");

        match self.state.phase {
            SessionPhase::Active => {
                self.release_surface();
                self.state.phase = SessionPhase::Inactive;
                self.activate();
            }
            SessionPhase::Inactive => {
                self.host.set_toggle_label(self.state.view_mode.toggle_label());
            }
        }
    }

    pub fn on_script_completed(&mut self, ticket: CommandTicket, result: String) {
        match self.pending.remove(&ticket.id) {
            Some(pending) if pending.generation == ticket.generation => {
                (pending.completion)(result);
            }
            _ => {
                tracing::debug!(
                    ticket = ticket.id,
                    generation = %ticket.generation,
                    "Ignoring stale script completion"
                );
            }
        }
    }

    /// Evaluate `payload` on the live surface.
    ///
    /// Returns false when there is no live surface or the surface refused the
    /// script; the command is dropped either way.
    pub fn submit(&mut self, payload: ScriptPayload, completion: Option<Completion>) -> bool {
        let Some(live) = self.state.surface.as_mut() else {
            tracing::debug!(ops = payload.ops().len(), "No live surface, command dropped");
            return false;
        };
        let generation = live.generation;

        let ticket = match completion {
            Some(completion) => {
                self.last_command_id += 1;
                let ticket = CommandTicket {
                    id: self.last_command_id,
                    generation,
                };
                self.pending.insert(
                    ticket.id,
                    PendingCommand {
                        generation,
                        completion,
                    },
                );
                Some(ticket)
            }
            None => None,
        };

        match live.surface.evaluate(&payload, ticket) {
            Ok(()) => {
                tracing::debug!(
                    generation = %generation,
                    target = %self.state.view_mode.target_element(),
                    ops = payload.ops().len(),
                    ticket = ?ticket.map(|t| t.id),
                    "Submitted script"
                );
                true
            }
            Err(e) => {
                if let Some(ticket) = ticket {
                    self.pending.remove(&ticket.id);
                }
                tracing::error!(generation = %generation, error = %e, "Failed to submit script");
                false
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let live = self.state.surface.as_ref();
        SessionSnapshot {
            view_mode: self.state.view_mode,
            toggle_label: self.state.view_mode.toggle_label().to_string(),
            phase: self.state.phase,
            cursor: self.state.catalog.cursor(),
            current_item: self.state.catalog.current().clone(),
            surface_generation: live.map(|l| l.generation),
            surface_created_at: live.map(|l| l.created_at),
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.view_mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    pub fn surface_generation(&self) -> Option<SurfaceGeneration> {
        self.state.surface.as_ref().map(|l| l.generation)
    }

    /// Active, but the surface could not be created
    pub fn is_degraded(&self) -> bool {
        self.state.phase == SessionPhase::Active && self.state.surface.is_none()
    }

    fn is_live(&self, generation: SurfaceGeneration) -> bool {
        self.surface_generation() == Some(generation)
    }

    /// Create a surface for the current mode and start loading its page
    fn activate(&mut self) {
        self.state.phase = SessionPhase::Active;
        self.last_generation = self.last_generation.next();
        let generation = self.last_generation;

        if let Err(e) = self.start_surface(generation) {
            tracing::error!(generation = %generation, error = %e, "Failed to initialise surface");
        }

        self.host.set_toggle_label(self.state.view_mode.toggle_label());
    }

    fn start_surface(&mut self, generation: SurfaceGeneration) -> Result<()> {
        let url = self.config.target_url(self.state.view_mode)?;

        let request = SurfaceRequest {
            generation,
            config: self.config.surface,
            events: self.events.clone(),
        };
        let mut surface = self.host.create_surface(request)?;

        tracing::info!(
            generation = %generation,
            mode = %self.state.view_mode,
            url = %url,
            "Created surface"
        );

        // Keep the surface even if navigation fails; it just never loads
        let navigation = surface.navigate(&url);
        self.state.surface = Some(LiveSurface::new(generation, surface));
        navigation?;

        Ok(())
    }

    fn release_surface(&mut self) {
        let Some(live) = self.state.surface.take() else {
            return;
        };

        let generation = live.generation;
        self.pending.retain(|_, pending| pending.generation != generation);
        let lived = Utc::now() - live.created_at;

        self.host.release_surface(live.surface);

        tracing::info!(
            generation = %generation,
            lived_ms = lived.num_milliseconds(),
            "Released surface"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::session_channel;
    use crate::testing::{HostEvent, RecordingHost};
    use std::sync::atomic::{AtomicBool, Ordering};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use vyking_trust::{TrustDecision, TrustFailureKind};

    fn controller_with(host: RecordingHost) -> SessionController<RecordingHost> {
        let (events, _receiver) = session_channel();
        SessionController::new(Config::default(), host, events).unwrap()
    }

    fn active_controller() -> (SessionController<RecordingHost>, RecordingHost) {
        let host = RecordingHost::default();
        let mut controller = controller_with(host.clone());
        controller.on_permission_granted();
        (controller, host)
    }

    fn generation(value: u64) -> SurfaceGeneration {
        SurfaceGeneration::new(value)
    }

    #[test]
    fn test_starts_inactive_without_surface() {
        let host = RecordingHost::default();
        let controller = controller_with(host.clone());

        assert_eq!(controller.phase(), SessionPhase::Inactive);
        assert_eq!(controller.view_mode(), ViewMode::ModelViewer);
        assert!(controller.surface_generation().is_none());
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (events, _receiver) = session_channel();
        let config = Config {
            catalog: Vec::new(),
            ..Config::default()
        };
        assert!(SessionController::new(config, RecordingHost::default(), events).is_err());
    }

    #[test]
    fn test_permission_granted_loads_model_viewer_then_configures() {
        let (mut controller, host) = active_controller();

        assert_eq!(controller.phase(), SessionPhase::Active);
        assert_eq!(
            host.events(),
            vec![
                HostEvent::Created {
                    generation: 1,
                    config: Config::default().surface,
                },
                HostEvent::Navigated {
                    generation: 1,
                    url: Config::default().model_viewer_url,
                },
                HostEvent::Label("Try-on".to_string()),
            ]
        );

        let _ = controller.handle(SessionEvent::LoadFinished {
            generation: generation(1),
            url: Config::default().model_viewer_url,
        });

        let scripts = host.scripts();
        assert_eq!(scripts.len(), 2);
        // Configure first, then the first catalog item
        assert!(scripts[0].contains("setAttribute('vto-key', 'io.vyking')"));
        assert!(scripts[1].contains("setAttribute('alt', 'Yeezy Boost 700 Carbon Blue')"));
        assert!(scripts[1].contains("yeezy_boost_700_carbon_blue/offsets.json"));
    }

    #[test]
    fn test_configure_has_ticket_replace_does_not() {
        let (mut controller, host) = active_controller();
        let _ = controller.handle(SessionEvent::LoadFinished {
            generation: generation(1),
            url: String::new(),
        });

        let tickets = host.tickets();
        assert_eq!(tickets.len(), 2);
        assert!(tickets[0].is_some());
        assert!(tickets[1].is_none());
    }

    #[test]
    fn test_permission_denied_shows_notice() {
        let host = RecordingHost::default();
        let mut controller = controller_with(host.clone());

        controller.on_permission_denied();

        assert_eq!(controller.phase(), SessionPhase::Inactive);
        assert_eq!(
            host.events(),
            vec![HostEvent::Notice("Camera permission is required.".to_string())]
        );
    }

    #[test]
    fn test_repeated_grant_keeps_single_surface() {
        let (mut controller, host) = active_controller();
        controller.on_permission_granted();

        assert_eq!(host.created_count(), 1);
        assert_eq!(controller.surface_generation(), Some(generation(1)));
    }

    #[test]
    fn test_five_advances_cycle_through_catalog() {
        let (mut controller, host) = active_controller();
        let names: Vec<String> = Config::default()
            .catalog
            .into_iter()
            .map(|e| e.display_name)
            .collect();

        for _ in 0..5 {
            controller.on_advance_catalog();
        }

        let scripts = host.scripts();
        assert_eq!(scripts.len(), 5);
        for (script, index) in scripts.iter().zip([1, 2, 3, 4, 0]) {
            assert!(
                script.contains(&format!("setAttribute('alt', '{}')", names[index])),
                "expected {} in {script}",
                names[index]
            );
        }
        assert_eq!(controller.catalog().cursor(), 0);
    }

    #[test]
    fn test_advance_without_surface_moves_cursor_only() {
        let host = RecordingHost::default();
        let mut controller = controller_with(host.clone());

        controller.on_advance_catalog();

        assert_eq!(controller.catalog().cursor(), 1);
        assert!(host.scripts().is_empty());
    }

    #[test]
    fn test_clear_item_removes_attributes() {
        let (mut controller, host) = active_controller();
        controller.on_clear_item();

        let scripts = host.scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains("removeAttribute('vyking-src')"));
    }

    #[derive(Clone, Default)]
    struct ResponderLog(Arc<Mutex<Vec<TrustDecision>>>);

    impl TrustResponder for ResponderLog {
        fn proceed(self: Box<Self>) {
            self.0.lock().push(TrustDecision::Proceed);
        }

        fn cancel(self: Box<Self>) {
            self.0.lock().push(TrustDecision::Abort);
        }
    }

    #[test]
    fn test_trust_failures_per_host() {
        let (mut controller, _host) = active_controller();
        let log = ResponderLog::default();

        for url in ["https://192.168.0.20:8443/", "https://10.0.0.5:8443/"] {
            let _ = controller.handle(SessionEvent::TrustFailure {
                generation: generation(1),
                failure: TrustFailure::from_url(TrustFailureKind::IssuerNotTrusted, url),
                responder: Box::new(log.clone()),
            });
        }
        let _ = controller.handle(SessionEvent::TrustFailure {
            generation: generation(1),
            failure: TrustFailure::from_url(TrustFailureKind::Expired, "https://localhost/"),
            responder: Box::new(log.clone()),
        });

        assert_eq!(
            *log.0.lock(),
            vec![
                TrustDecision::Proceed,
                TrustDecision::Abort,
                TrustDecision::Abort
            ]
        );
    }

    #[test]
    fn test_trust_failure_from_released_surface_cancelled() {
        let (mut controller, _host) = active_controller();
        controller.on_toggle_view_mode();
        let log = ResponderLog::default();

        let _ = controller.handle(SessionEvent::TrustFailure {
            generation: generation(1),
            failure: TrustFailure::from_url(
                TrustFailureKind::IssuerNotTrusted,
                "https://localhost/",
            ),
            responder: Box::new(log.clone()),
        });

        assert_eq!(*log.0.lock(), vec![TrustDecision::Abort]);
    }

    #[test]
    fn test_toggle_twice_restores_mode_and_label() {
        let (mut controller, host) = active_controller();
        let baseline = host.events().len();

        controller.on_toggle_view_mode();
        assert_eq!(controller.view_mode(), ViewMode::ApparelTryOn);
        assert_eq!(host.last_label().as_deref(), Some("View Model"));

        controller.on_toggle_view_mode();
        assert_eq!(controller.view_mode(), ViewMode::ModelViewer);
        assert_eq!(host.last_label().as_deref(), Some("Try-on"));

        let toggled = &host.events()[baseline..];
        let created = toggled
            .iter()
            .filter(|e| matches!(e, HostEvent::Created { .. }))
            .count();
        let released = toggled
            .iter()
            .filter(|e| matches!(e, HostEvent::Released { .. }))
            .count();
        assert_eq!(created, 2);
        assert_eq!(released, 2);
        assert_eq!(controller.surface_generation(), Some(generation(3)));
    }

    #[test]
    fn test_toggle_releases_before_creating() {
        let (mut controller, host) = active_controller();
        let baseline = host.events().len();

        controller.on_toggle_view_mode();

        let toggled = host.events()[baseline..].to_vec();
        assert_eq!(toggled[0], HostEvent::Released { generation: 1 });
        assert!(matches!(toggled[1], HostEvent::Created { generation: 2, .. }));
        assert_eq!(
            toggled[2],
            HostEvent::Navigated {
                generation: 2,
                url: Config::default().apparel_url,
            }
        );
    }

    #[test]
    fn test_toggle_while_inactive_updates_label_only() {
        let host = RecordingHost::default();
        let mut controller = controller_with(host.clone());

        controller.on_toggle_view_mode();

        assert_eq!(controller.phase(), SessionPhase::Inactive);
        assert_eq!(controller.view_mode(), ViewMode::ApparelTryOn);
        assert_eq!(host.events(), vec![HostEvent::Label("View Model".to_string())]);
    }

    #[test]
    fn test_load_from_released_surface_ignored() {
        let (mut controller, host) = active_controller();
        controller.on_toggle_view_mode();

        let _ = controller.handle(SessionEvent::LoadFinished {
            generation: generation(1),
            url: String::new(),
        });

        assert!(host.scripts().is_empty());
    }

    #[test]
    fn test_completion_runs_for_live_surface() {
        let (mut controller, host) = active_controller();
        let received = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&received);

        assert!(controller.submit(
            build_remove_item_command(),
            Some(Box::new(move |result| {
                *sink.lock() = Some(result);
            })),
        ));

        let ticket = host.tickets()[0].unwrap();
        let _ = controller.handle(SessionEvent::ScriptCompleted {
            ticket,
            result: "null".to_string(),
        });

        assert_eq!(received.lock().as_deref(), Some("null"));
    }

    #[test]
    fn test_stale_completion_is_noop() {
        let (mut controller, host) = active_controller();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        controller.submit(
            build_remove_item_command(),
            Some(Box::new(move |_| flag.store(true, Ordering::SeqCst))),
        );
        let ticket = host.tickets()[0].unwrap();

        controller.on_toggle_view_mode();
        let _ = controller.handle(SessionEvent::ScriptCompleted {
            ticket,
            result: String::new(),
        });

        assert!(!fired.load(Ordering::SeqCst));
        assert_eq!(controller.phase(), SessionPhase::Active);
    }

    #[test]
    fn test_create_failure_leaves_degraded_active_session() {
        let host = RecordingHost::failing_create();
        let mut controller = controller_with(host.clone());

        controller.on_permission_granted();

        assert_eq!(controller.phase(), SessionPhase::Active);
        assert!(controller.is_degraded());
        assert_eq!(host.last_label().as_deref(), Some("Try-on"));

        controller.on_advance_catalog();
        assert_eq!(controller.catalog().cursor(), 1);
        assert!(host.scripts().is_empty());
    }

    #[test]
    fn test_navigation_failure_keeps_surface() {
        let host = RecordingHost::failing_navigate();
        let mut controller = controller_with(host.clone());

        controller.on_permission_granted();

        assert_eq!(controller.phase(), SessionPhase::Active);
        assert!(!controller.is_degraded());
        assert_eq!(controller.surface_generation(), Some(generation(1)));
    }

    #[test]
    fn test_evaluate_failure_drops_command() {
        let host = RecordingHost::failing_evaluate();
        let mut controller = controller_with(host.clone());
        controller.on_permission_granted();

        assert!(!controller.submit(build_remove_item_command(), Some(Box::new(|_| {}))));
        assert!(controller.pending.is_empty());
    }

    #[test]
    fn test_shutdown_releases_surface() {
        let (mut controller, host) = active_controller();

        assert!(controller.handle(SessionEvent::Shutdown).is_break());
        assert_eq!(host.events().last(), Some(&HostEvent::Released { generation: 1 }));
        assert_eq!(controller.phase(), SessionPhase::Inactive);
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let (mut controller, _host) = active_controller();
        controller.on_advance_catalog();

        let json = serde_json::to_value(controller.snapshot()).unwrap();
        assert_eq!(json["view_mode"], "model_viewer");
        assert_eq!(json["toggle_label"], "Try-on");
        assert_eq!(json["phase"], "active");
        assert_eq!(json["cursor"], 1);
        assert_eq!(json["current_item"]["display_name"], "Adidas GY1121");
        assert_eq!(json["surface_generation"], 1);
        assert!(json["surface_created_at"].is_string());
    }
}
