// src/core/report.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::core::models::{Finding, ScanTarget, Severity};

/// Per-severity counts, computed once when the report is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReportSummary {
    total_findings: usize,
    high_severity: usize,
    medium_severity: usize,
    low_severity: usize,
}

impl ReportSummary {
    /// Counts findings by severity.
    pub fn from_findings(findings: &[Finding]) -> Self {
        let count = |severity: Severity| findings.iter().filter(|f| f.severity() == severity).count();
        Self {
            total_findings: findings.len(),
            high_severity: count(Severity::High),
            medium_severity: count(Severity::Medium),
            low_severity: count(Severity::Low),
        }
    }

    pub fn total_findings(&self) -> usize {
        self.total_findings
    }

    pub fn high_severity(&self) -> usize {
        self.high_severity
    }

    pub fn medium_severity(&self) -> usize {
        self.medium_severity
    }

    pub fn low_severity(&self) -> usize {
        self.low_severity
    }

    /// Informational findings are not serialized but are the remainder of
    /// the total.
    pub fn info_severity(&self) -> usize {
        self.total_findings
            .saturating_sub(self.high_severity)
            .saturating_sub(self.medium_severity)
            .saturating_sub(self.low_severity)
    }
}

/// The aggregated result of one scan invocation.
///
/// Field order here is the key order of the serialized document. Fields are
/// private: the summary is computed once from the findings and cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    scan_target: String,
    scan_time: DateTime<Utc>,
    findings: Vec<Finding>,
    summary: ReportSummary,
}

impl ScanReport {
    /// Builds the report. Findings are kept exactly in the order given.
    pub fn build(target: &ScanTarget, findings: Vec<Finding>, scan_time: DateTime<Utc>) -> Self {
        let summary = ReportSummary::from_findings(&findings);
        debug!(
            target = %target,
            total = summary.total_findings,
            high = summary.high_severity,
            "Built scan report."
        );
        Self {
            scan_target: target.display().to_string(),
            scan_time,
            findings,
            summary,
        }
    }

    /// Builds the report stamped with the current time.
    pub fn new(target: &ScanTarget, findings: Vec<Finding>) -> Self {
        Self::build(target, findings, Utc::now())
    }

    pub fn scan_target(&self) -> &str {
        &self.scan_target
    }

    pub fn scan_time(&self) -> DateTime<Utc> {
        self.scan_time
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn summary(&self) -> ReportSummary {
        self.summary
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
