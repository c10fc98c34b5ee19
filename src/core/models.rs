// src/core/models.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter};
use url::{Host, Url};

use crate::core::knowledge_base;

// --- Severity & Finding Kinds ---

/// Ordinal severity of a finding. Declaration order is the ordering:
/// `Info < Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

/// The category of a finding. Serialized as the `type` field of the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FindingKind {
    SslExpired,
    WeakSslVersion,
    SslError,
    MissingSecurityHeader,
    OpenPort,
    InformationDisclosure,
    RequestError,
}

impl FindingKind {
    /// Severity of this kind, as recorded in the knowledge base.
    ///
    /// This is the only place a severity is derived; every `Finding` goes
    /// through it.
    pub fn severity(self) -> Severity {
        knowledge_base::get_finding_detail(self)
            .map(|detail| detail.severity)
            .unwrap_or(Severity::Info)
    }
}

// --- Finding ---

/// A single classified observation about the target.
///
/// Fields are private: a finding cannot be edited after construction and its
/// severity always agrees with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    #[serde(rename = "type")]
    kind: FindingKind,
    severity: Severity,
    description: String,
}

impl Finding {
    /// Creates a finding. An empty description falls back to the knowledge
    /// base title so the field is never blank.
    pub fn new(kind: FindingKind, description: impl Into<String>) -> Self {
        let mut description = description.into();
        if description.trim().is_empty() {
            description = knowledge_base::get_finding_detail(kind)
                .map(|detail| detail.title.to_string())
                .unwrap_or_else(|| kind.to_string());
        }
        Self {
            kind,
            severity: kind.severity(),
            description,
        }
    }

    pub fn kind(&self) -> FindingKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

// --- Scan Target ---

/// Reasons a raw target string is rejected before any probe runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("target is empty")]
    Empty,
    #[error("unsupported scheme '{0}': only http and https targets can be scanned")]
    UnsupportedScheme(String),
    #[error("invalid target '{input}': {reason}")]
    Invalid { input: String, reason: String },
    #[error("target '{0}' has no host")]
    MissingHost(String),
}

/// The normalized identity of the host under scan.
///
/// Built once per scan from the operator's input and shared read-only by
/// every probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    raw: String,
    hostname: String,
    base_url: Url,
}

impl ScanTarget {
    /// Normalizes a raw host, domain or URL.
    ///
    /// Input without a scheme is treated as `https://<input>`. The hostname is
    /// the URL host without scheme, port, path or IPv6 brackets.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TargetError::Empty);
        }

        let with_scheme = match explicit_scheme(trimmed) {
            Some(scheme) => {
                let scheme = scheme.to_ascii_lowercase();
                if scheme != "http" && scheme != "https" {
                    return Err(TargetError::UnsupportedScheme(scheme));
                }
                trimmed.to_string()
            }
            None => format!("https://{trimmed}"),
        };

        let base_url = Url::parse(&with_scheme).map_err(|e| TargetError::Invalid {
            input: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        let hostname = match base_url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            _ => return Err(TargetError::MissingHost(trimmed.to_string())),
        };

        Ok(Self {
            raw: raw.to_string(),
            hostname,
            base_url,
        })
    }

    /// The string exactly as the operator supplied it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The form used as `scan_target` in reports.
    pub fn display(&self) -> &str {
        self.base_url.as_str()
    }
}

impl FromStr for ScanTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// Returns the scheme if `input` starts with `<scheme>://`.
fn explicit_scheme(input: &str) -> Option<&str> {
    let (scheme, _) = input.split_once("://")?;
    let looks_like_scheme = !scheme.is_empty()
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    looks_like_scheme.then_some(scheme)
}
