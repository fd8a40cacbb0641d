//! Trust decisions

use serde::{Deserialize, Serialize};

use crate::failure::{TrustFailure, TrustFailureKind};

/// Hosts allowed to present an untrusted issuer
pub const DEVELOPMENT_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "192.168.0.20"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustDecision {
    /// Continue the connection despite the failure
    Proceed,
    /// Terminate this navigation attempt
    Abort,
}

impl TrustDecision {
    /// Hand the decision to the surface that raised the failure
    pub fn apply(self, responder: Box<dyn TrustResponder>) {
        match self {
            TrustDecision::Proceed => responder.proceed(),
            TrustDecision::Abort => responder.cancel(),
        }
    }
}

/// One-shot handle for a pending certificate failure.
///
/// Exactly one of the two methods is called per failure.
pub trait TrustResponder: Send {
    fn proceed(self: Box<Self>);
    fn cancel(self: Box<Self>);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrustPolicy;

impl TrustPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, kind: TrustFailureKind, host: &str) -> TrustDecision {
        match kind {
            TrustFailureKind::IssuerNotTrusted if DEVELOPMENT_HOSTS.contains(&host) => {
                TrustDecision::Proceed
            }
            _ => TrustDecision::Abort,
        }
    }

    pub fn evaluate_failure(&self, failure: &TrustFailure) -> TrustDecision {
        let decision = self.evaluate(failure.kind, &failure.host);

        match decision {
            TrustDecision::Proceed => tracing::info!(
                kind = %failure.kind,
                host = %failure.host,
                "Proceeding past certificate failure for development host"
            ),
            TrustDecision::Abort => tracing::warn!(
                kind = %failure.kind,
                host = %failure.host,
                url = %failure.url,
                "Aborting navigation after certificate failure"
            ),
        }

        decision
    }
}
