// src/core/knowledge_base.rs

//! Static, read-only database of every finding the scanner can emit.
//!
//! Each entry carries the severity for its kind, which makes this table the
//! single source of the kind to severity mapping, plus the human-readable
//! explanation and remediation advice shown by the terminal UI.

use crate::core::models::{FindingKind, Severity};
use std::fmt;

/// High-level grouping of findings, used to prefix entries in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingCategory {
    /// Certificate and protocol posture of the TLS endpoint.
    Tls,
    /// HTTP responses: security headers and exposed paths.
    Http,
    /// Reachability of TCP ports.
    Network,
    /// Checks that could not be completed.
    Scanner,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::Tls => write!(f, "SSL/TLS"),
            FindingCategory::Http => write!(f, "HTTP"),
            FindingCategory::Network => write!(f, "Network"),
            FindingCategory::Scanner => write!(f, "Scanner"),
        }
    }
}

/// Everything the scanner knows about one kind of finding.
pub struct FindingDetail {
    /// The finding kind this entry describes.
    pub kind: FindingKind,
    /// A short, human-readable title.
    pub title: &'static str,
    pub category: FindingCategory,
    /// The one severity every finding of this kind carries.
    pub severity: Severity,
    /// What the finding means and why it matters.
    pub explanation: &'static str,
    /// Actionable steps to fix the issue.
    pub remediation: &'static str,
}

static FINDINGS: &[FindingDetail] = &[
    // --- SSL/TLS ---
    FindingDetail {
        kind: FindingKind::SslExpired,
        title: "SSL Certificate Expired",
        category: FindingCategory::Tls,
        severity: Severity::High,
        explanation: "The certificate presented on the TLS port is past its expiry date. Browsers show blocking warnings and clients that ignore them are exposed to interception.",
        remediation: "Renew the certificate immediately and automate renewal (for example with an ACME client) so it cannot lapse again.",
    },
    FindingDetail {
        kind: FindingKind::WeakSslVersion,
        title: "Weak SSL/TLS Version",
        category: FindingCategory::Tls,
        severity: Severity::Medium,
        explanation: "The server negotiated SSLv3, TLS 1.0 or TLS 1.1. These protocol versions are deprecated and have known cryptographic weaknesses.",
        remediation: "Disable SSLv3, TLS 1.0 and TLS 1.1 in the server configuration and allow only TLS 1.2 and TLS 1.3.",
    },
    FindingDetail {
        kind: FindingKind::SslError,
        title: "TLS Connection Failed",
        category: FindingCategory::Tls,
        severity: Severity::High,
        explanation: "A TLS session could not be established with the target. The host may be unreachable, may not serve TLS, or may present a certificate that cannot be parsed.",
        remediation: "Verify that the host serves HTTPS on the expected port with a well-formed certificate. Tools such as SSL Labs help diagnose handshake failures.",
    },
    // --- HTTP ---
    FindingDetail {
        kind: FindingKind::MissingSecurityHeader,
        title: "Security Header Missing",
        category: FindingCategory::Http,
        severity: Severity::Medium,
        explanation: "A response header that hardens browsers against downgrade, clickjacking, MIME sniffing or script injection is absent.",
        remediation: "Add the header to every response: 'Strict-Transport-Security: max-age=31536000; includeSubDomains', 'X-Content-Type-Options: nosniff', 'X-Frame-Options: DENY' and a restrictive 'Content-Security-Policy'.",
    },
    FindingDetail {
        kind: FindingKind::InformationDisclosure,
        title: "Sensitive Path Exposed",
        category: FindingCategory::Http,
        severity: Severity::Medium,
        explanation: "A predictable path such as a VCS directory, environment file, backup folder or diagnostics page is directly reachable and may leak source code, credentials or internal layout.",
        remediation: "Remove the resource from the web root or deny access to it in the server configuration. Rotate any secret that may have been exposed.",
    },
    // --- Network ---
    FindingDetail {
        kind: FindingKind::OpenPort,
        title: "Open Port",
        category: FindingCategory::Network,
        severity: Severity::Low,
        explanation: "A common service port accepts TCP connections from the internet. Every listening service adds to the exposed attack surface.",
        remediation: "Confirm the service must be public. Otherwise close the port or restrict it with a firewall.",
    },
    // --- Scanner ---
    FindingDetail {
        kind: FindingKind::RequestError,
        title: "Check Could Not Complete",
        category: FindingCategory::Scanner,
        severity: Severity::Info,
        explanation: "One of the checks failed before it could observe the target, so its results are missing from this report.",
        remediation: "Verify that the target is online and reachable from the scanning host, then run the scan again.",
    },
];

/// Looks up the knowledge base entry for a finding kind.
pub fn get_finding_detail(kind: FindingKind) -> Option<&'static FindingDetail> {
    FINDINGS.iter().find(|f| f.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Finding;
    use strum::IntoEnumIterator;

    #[test]
    fn every_kind_has_exactly_one_entry() {
        for kind in FindingKind::iter() {
            let entries = FINDINGS.iter().filter(|f| f.kind == kind).count();
            assert_eq!(entries, 1, "{kind} must appear exactly once");
        }
        assert_eq!(FINDINGS.len(), FindingKind::iter().count());
    }

    #[test]
    fn severity_table_matches_fixed_mapping() {
        let expected = [
            (FindingKind::SslExpired, Severity::High),
            (FindingKind::SslError, Severity::High),
            (FindingKind::WeakSslVersion, Severity::Medium),
            (FindingKind::MissingSecurityHeader, Severity::Medium),
            (FindingKind::InformationDisclosure, Severity::Medium),
            (FindingKind::OpenPort, Severity::Low),
            (FindingKind::RequestError, Severity::Info),
        ];
        for (kind, severity) in expected {
            assert_eq!(kind.severity(), severity, "{kind}");
        }
    }

    #[test]
    fn findings_agree_with_table_for_all_kinds() {
        for kind in FindingKind::iter() {
            let finding = Finding::new(kind, "observed");
            let detail = get_finding_detail(kind).unwrap();
            assert_eq!(finding.severity(), detail.severity);
        }
    }

    #[test]
    fn entries_have_text() {
        for detail in FINDINGS {
            assert!(!detail.title.is_empty());
            assert!(!detail.explanation.is_empty());
            assert!(!detail.remediation.is_empty());
        }
    }
}
