//! Certificate failure reports

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustFailureKind {
    /// Certificate is not valid yet
    NotYetValid,
    /// Certificate has expired
    Expired,
    /// Certificate was issued for a different host
    HostMismatch,
    /// Certificate authority is not trusted (self-signed included)
    IssuerNotTrusted,
    /// Certificate dates could not be validated
    DateInvalid,
    /// Generic validation failure
    Invalid,
}

impl TrustFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustFailureKind::NotYetValid => "not_yet_valid",
            TrustFailureKind::Expired => "expired",
            TrustFailureKind::HostMismatch => "host_mismatch",
            TrustFailureKind::IssuerNotTrusted => "issuer_not_trusted",
            TrustFailureKind::DateInvalid => "date_invalid",
            TrustFailureKind::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for TrustFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A certificate failure raised by a surface for one navigation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustFailure {
    pub kind: TrustFailureKind,
    pub url: String,
    /// Host of `url`; empty when the URL has no host
    pub host: String,
}

impl TrustFailure {
    pub fn new(kind: TrustFailureKind, url: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            host: host.into(),
        }
    }

    /// Build a failure whose host is taken from the failing URL.
    ///
    /// The host is the parser's canonical form: lowercased, with IPv4 shorthand
    /// such as `127.1` expanded to dotted quads.
    pub fn from_url(kind: TrustFailureKind, url: &str) -> Self {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        Self::new(kind, url, host)
    }
}
