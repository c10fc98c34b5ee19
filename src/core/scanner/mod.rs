// src/core/scanner/mod.rs

pub mod disclosure_scanner;
pub mod headers_scanner;
pub mod ports_scanner;
pub mod ssl_scanner;

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::config::ScanConfig;
use crate::core::models::{Finding, FindingKind, ScanTarget, TargetError};
use crate::core::report::ScanReport;
use self::disclosure_scanner::run_disclosure_scan;
use self::headers_scanner::run_headers_scan;
use self::ports_scanner::run_ports_scan;
use self::ssl_scanner::run_ssl_scan;

/// One independent check against a target.
///
/// A probe converts its own failures into findings (or skips them); it never
/// returns an error to the orchestrator.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Short name used in logs and in findings about the probe itself.
    fn name(&self) -> &'static str;

    async fn run(&self, target: &ScanTarget, config: &ScanConfig) -> Vec<Finding>;
}

pub struct TlsProbe;
pub struct HeadersProbe;
pub struct PortsProbe;
pub struct DisclosureProbe;

#[async_trait]
impl Probe for TlsProbe {
    fn name(&self) -> &'static str {
        "tls"
    }

    async fn run(&self, target: &ScanTarget, config: &ScanConfig) -> Vec<Finding> {
        run_ssl_scan(target, config).await
    }
}

#[async_trait]
impl Probe for HeadersProbe {
    fn name(&self) -> &'static str {
        "security_headers"
    }

    async fn run(&self, target: &ScanTarget, config: &ScanConfig) -> Vec<Finding> {
        run_headers_scan(target, config).await
    }
}

#[async_trait]
impl Probe for PortsProbe {
    fn name(&self) -> &'static str {
        "open_ports"
    }

    async fn run(&self, target: &ScanTarget, config: &ScanConfig) -> Vec<Finding> {
        run_ports_scan(target, config).await
    }
}

#[async_trait]
impl Probe for DisclosureProbe {
    fn name(&self) -> &'static str {
        "information_disclosure"
    }

    async fn run(&self, target: &ScanTarget, config: &ScanConfig) -> Vec<Finding> {
        run_disclosure_scan(target, config).await
    }
}

/// The standard battery, in report order.
pub fn default_probes() -> Vec<Arc<dyn Probe>> {
    vec![
        Arc::new(TlsProbe),
        Arc::new(HeadersProbe),
        Arc::new(PortsProbe),
        Arc::new(DisclosureProbe),
    ]
}

/// Runs a set of probes against one target and merges their findings.
pub struct Scanner {
    config: Arc<ScanConfig>,
    probes: Vec<Arc<dyn Probe>>,
}

impl Scanner {
    /// A scanner with the standard battery of probes.
    pub fn new(config: ScanConfig) -> Self {
        Self::with_probes(config, default_probes())
    }

    pub fn with_probes(config: ScanConfig, probes: Vec<Arc<dyn Probe>>) -> Self {
        Self {
            config: Arc::new(config),
            probes,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Normalizes `raw`, runs every probe and returns the merged findings.
    /// Invalid input is rejected before any probe runs.
    pub async fn run_full_scan(&self, raw: &str) -> Result<Vec<Finding>, TargetError> {
        let target = ScanTarget::parse(raw)?;
        Ok(self.execute(&target).await)
    }

    /// Runs a full scan of `raw` and builds the report.
    pub async fn scan(&self, raw: &str) -> Result<ScanReport, TargetError> {
        let target = ScanTarget::parse(raw)?;
        let findings = self.execute(&target).await;
        Ok(ScanReport::new(&target, findings))
    }

    /// Runs every probe concurrently against an already-normalized target.
    ///
    /// Findings are merged in probe registration order regardless of which
    /// probe finishes first. A probe task that panics contributes one
    /// `request_error` instead of its findings. If the whole battery exceeds
    /// the scan budget, outstanding probes are aborted and the result is a
    /// single `request_error` describing the expiry.
    pub async fn execute(&self, target: &ScanTarget) -> Vec<Finding> {
        info!(target = %target, probes = self.probes.len(), "Starting full scan.");
        let shared_target = Arc::new(target.clone());

        let handles: Vec<_> = self
            .probes
            .iter()
            .map(|probe| {
                let probe = Arc::clone(probe);
                let target = Arc::clone(&shared_target);
                let config = Arc::clone(&self.config);
                tokio::spawn(async move { probe.run(&target, &config).await })
            })
            .collect();
        let abort_handles: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();

        let budget = self.config.scan_timeout();
        let results = match tokio::time::timeout(budget, join_all(handles)).await {
            Ok(results) => results,
            Err(_) => {
                error!(budget_secs = budget.as_secs(), "Scan exceeded its time budget, aborting probes.");
                for handle in abort_handles {
                    handle.abort();
                }
                return vec![Finding::new(
                    FindingKind::RequestError,
                    format!(
                        "Scan did not complete within {}s; no results were collected",
                        budget.as_secs()
                    ),
                )];
            }
        };

        let findings: Vec<Finding> = results
            .into_iter()
            .zip(&self.probes)
            .flat_map(|(result, probe)| match result {
                Ok(findings) => {
                    info!(probe = probe.name(), findings = findings.len(), "Probe completed.");
                    findings
                }
                Err(e) => {
                    warn!(probe = probe.name(), error = %e, "Probe task failed unexpectedly.");
                    vec![Finding::new(
                        FindingKind::RequestError,
                        format!("The {} check failed unexpectedly: {e}", probe.name()),
                    )]
                }
            })
            .collect();

        info!(total = findings.len(), "Full scan finished.");
        findings
    }
}

/// HTTP client shared by the header and disclosure probes. Certificate
/// verification is off because these probes look at responses, not trust.
pub(crate) fn build_http_client(config: &ScanConfig, follow_redirects: bool) -> reqwest::Result<reqwest::Client> {
    let redirect = if follow_redirects {
        reqwest::redirect::Policy::default()
    } else {
        reqwest::redirect::Policy::none()
    };
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .danger_accept_invalid_certs(true)
        .redirect(redirect)
        .timeout(config.http_timeout())
        .build()
}
