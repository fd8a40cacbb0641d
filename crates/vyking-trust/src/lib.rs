//! Vyking Trust Policy
//!
//! Decides whether a surface may proceed past a certificate validation failure.
//!
//! | Failure            | Host                                      | Decision |
//! | IssuerNotTrusted   | localhost, 127.0.0.1, 192.168.0.20        | Proceed  |
//! | IssuerNotTrusted   | anything else                             | Abort    |
//! | any other kind     | any                                       | Abort    |
//!
//! The allowed hosts exist so development servers with self-signed certificates
//! can be loaded. Matching is exact string equality on the host. A host taken
//! from a URL by [`TrustFailure::from_url`] is already canonical, so `LOCALHOST`
//! or `127.1` in a URL still reach an allowed entry.

mod failure;
mod policy;

pub use failure::{TrustFailure, TrustFailureKind};
pub use policy::{TrustDecision, TrustPolicy, TrustResponder, DEVELOPMENT_HOSTS};
