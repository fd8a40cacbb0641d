//! Recording host for controller tests

use parking_lot::Mutex;
use std::sync::Arc;
use url::Url;
use vyking_protocol::ScriptPayload;

use crate::config::SurfaceConfig;
use crate::error::SurfaceError;
use crate::surface::{CommandTicket, RenderingSurface, SurfaceHost, SurfaceRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Created {
        generation: u64,
        config: SurfaceConfig,
    },
    Navigated {
        generation: u64,
        url: String,
    },
    Evaluated {
        generation: u64,
        script: String,
        ticket: Option<CommandTicket>,
    },
    Released {
        generation: u64,
    },
    Label(String),
    Notice(String),
}

#[derive(Debug, Clone, Copy, Default)]
struct Failures {
    create: bool,
    navigate: bool,
    evaluate: bool,
}

#[derive(Clone, Default)]
pub struct RecordingHost {
    log: Arc<Mutex<Vec<HostEvent>>>,
    failures: Failures,
}

impl RecordingHost {
    pub fn failing_create() -> Self {
        Self::with_failures(Failures {
            create: true,
            ..Failures::default()
        })
    }

    pub fn failing_navigate() -> Self {
        Self::with_failures(Failures {
            navigate: true,
            ..Failures::default()
        })
    }

    pub fn failing_evaluate() -> Self {
        Self::with_failures(Failures {
            evaluate: true,
            ..Failures::default()
        })
    }

    fn with_failures(failures: Failures) -> Self {
        Self {
            log: Arc::default(),
            failures,
        }
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.log.lock().clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .filter_map(|e| match e {
                HostEvent::Evaluated { script, .. } => Some(script.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn tickets(&self) -> Vec<Option<CommandTicket>> {
        self.log
            .lock()
            .iter()
            .filter_map(|e| match e {
                HostEvent::Evaluated { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .collect()
    }

    pub fn created_count(&self) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|e| matches!(e, HostEvent::Created { .. }))
            .count()
    }

    pub fn last_label(&self) -> Option<String> {
        self.log.lock().iter().rev().find_map(|e| match e {
            HostEvent::Label(label) => Some(label.clone()),
            _ => None,
        })
    }

    fn record(&self, event: HostEvent) {
        self.log.lock().push(event);
    }
}

pub struct RecordingSurface {
    generation: u64,
    host: RecordingHost,
}

impl RenderingSurface for RecordingSurface {
    fn navigate(&mut self, url: &Url) -> Result<(), SurfaceError> {
        if self.host.failures.navigate {
            return Err(SurfaceError::Navigate(format!("refused {url}")));
        }
        self.host.record(HostEvent::Navigated {
            generation: self.generation,
            url: url.to_string(),
        });
        Ok(())
    }

    fn evaluate(
        &mut self,
        payload: &ScriptPayload,
        ticket: Option<CommandTicket>,
    ) -> Result<(), SurfaceError> {
        if self.host.failures.evaluate {
            return Err(SurfaceError::Evaluate("surface gone".to_string()));
        }
        self.host.record(HostEvent::Evaluated {
            generation: self.generation,
            script: payload.to_string(),
            ticket,
        });
        Ok(())
    }
}

impl SurfaceHost for RecordingHost {
    type Surface = RecordingSurface;

    fn create_surface(&mut self, request: SurfaceRequest) -> Result<RecordingSurface, SurfaceError> {
        if self.failures.create {
            return Err(SurfaceError::Create("no container".to_string()));
        }
        let generation = request.generation.value();
        self.record(HostEvent::Created {
            generation,
            config: request.config,
        });
        Ok(RecordingSurface {
            generation,
            host: self.clone(),
        })
    }

    fn release_surface(&mut self, surface: RecordingSurface) {
        self.record(HostEvent::Released {
            generation: surface.generation,
        });
    }

    fn set_toggle_label(&mut self, label: &str) {
        self.record(HostEvent::Label(label.to_string()));
    }

    fn show_notice(&mut self, notice: &str) {
        self.record(HostEvent::Notice(notice.to_string()));
    }
}
