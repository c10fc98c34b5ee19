// src/app.rs

use std::path::{Path, PathBuf};

use ratatui::widgets::ListState;
use vanguard_recon::{Finding, ScanReport, ScanTarget};

pub const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub enum ExportStatus {
    Idle,
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// The legal notice is shown and must be acknowledged first.
    Disclaimer,
    Idle,
    Scanning,
    Finished,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub score: u8,
    pub high_issues: usize,
    pub medium_issues: usize,
    pub low_issues: usize,
    pub info_issues: usize,
}

impl ScanSummary {
    /// 100 minus 15 per HIGH, 5 per MEDIUM and 1 per LOW finding, floored at 0.
    pub fn from_report(report: &ScanReport) -> Self {
        let summary = report.summary();
        let penalty = summary.high_severity() * 15 + summary.medium_severity() * 5 + summary.low_severity();
        let score = 100usize.saturating_sub(penalty) as u8;

        Self {
            score,
            high_issues: summary.high_severity(),
            medium_issues: summary.medium_severity(),
            low_issues: summary.low_severity(),
            info_issues: summary.info_severity(),
        }
    }

    pub fn rating(&self) -> &'static str {
        match self.score {
            90..=100 => "Excellent",
            75..=89 => "Good",
            50..=74 => "Needs Improvement",
            _ => "Poor",
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input: String,
    pub input_error: Option<String>,
    pub target: Option<ScanTarget>,
    pub scan_report: Option<ScanReport>,
    pub summary: ScanSummary,
    pub analysis_list_state: ListState,
    pub spinner_frame: usize,
    pub export_status: ExportStatus,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Disclaimer,
            input: String::new(),
            input_error: None,
            target: None,
            scan_report: None,
            summary: ScanSummary::default(),
            analysis_list_state: ListState::default(),
            spinner_frame: 0,
            export_status: ExportStatus::Idle,
        }
    }

    pub fn findings(&self) -> &[Finding] {
        self.scan_report
            .as_ref()
            .map(|report| report.findings())
            .unwrap_or(&[])
    }

    pub fn selected_finding(&self) -> Option<&Finding> {
        self.analysis_list_state
            .selected()
            .and_then(|index| self.findings().get(index))
    }

    pub fn acknowledge_disclaimer(&mut self) {
        self.state = AppState::Idle;
    }

    /// Validates the typed target. On success the app switches to
    /// `Scanning` and returns the target to scan; on failure the reason is
    /// kept for the input box and the app stays idle.
    pub fn begin_scan(&mut self) -> Option<ScanTarget> {
        match ScanTarget::parse(&self.input) {
            Ok(target) => {
                tracing::info!(target = %target, "Starting scan from the terminal UI.");
                self.input_error = None;
                self.target = Some(target.clone());
                self.state = AppState::Scanning;
                Some(target)
            }
            Err(e) => {
                self.input_error = Some(e.to_string());
                None
            }
        }
    }

    pub fn finish_scan(&mut self, report: ScanReport) {
        self.scan_report = Some(report);
        self.state = AppState::Finished;
        self.update_summary();
        let first = (!self.findings().is_empty()).then_some(0);
        self.analysis_list_state.select(first);
    }

    pub fn select_next(&mut self) {
        let len = self.findings().len();
        if len == 0 {
            return;
        }
        let next = match self.analysis_list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.analysis_list_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        let len = self.findings().len();
        if len == 0 {
            return;
        }
        let previous = match self.analysis_list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.analysis_list_state.select(Some(previous));
    }

    pub fn update_summary(&mut self) {
        if let Some(report) = &self.scan_report {
            self.summary = ScanSummary::from_report(report);
        }
    }

    /// Writes the current report as `<host>_security_report.json` into `dir`.
    pub fn export_report(&mut self, dir: &Path) {
        let (Some(report), Some(target)) = (&self.scan_report, &self.target) else {
            self.export_status = ExportStatus::Error("No report to export".to_string());
            return;
        };

        let path = dir.join(export_file_name(target));
        let result = report
            .to_json(true)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));

        self.export_status = match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Report exported.");
                ExportStatus::Success(format!("Report saved to {}", path.display()))
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Report export failed.");
                ExportStatus::Error(format!("Export failed: {e}"))
            }
        };
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Scanning {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.input_error = None;
        self.target = None;
        self.scan_report = None;
        self.summary = ScanSummary::default();
        self.analysis_list_state = ListState::default();
        self.spinner_frame = 0;
        self.export_status = ExportStatus::Idle;
    }
}

/// Hostnames only ever contain characters safe in file names, except the
/// colons of an IPv6 literal.
fn export_file_name(target: &ScanTarget) -> PathBuf {
    let host: String = target
        .hostname()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    PathBuf::from(format!("{host}_security_report.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanguard_recon::{Finding, FindingKind};

    fn report_with(kinds: &[FindingKind]) -> ScanReport {
        let target = ScanTarget::parse("example.com").unwrap();
        let findings = kinds.iter().map(|kind| Finding::new(*kind, "x")).collect();
        ScanReport::new(&target, findings)
    }

    #[test]
    fn score_deducts_by_severity() {
        let report = report_with(&[
            FindingKind::SslExpired,
            FindingKind::MissingSecurityHeader,
            FindingKind::MissingSecurityHeader,
            FindingKind::OpenPort,
            FindingKind::RequestError,
        ]);
        let summary = ScanSummary::from_report(&report);
        assert_eq!(summary.score, 100 - 15 - 10 - 1);
        assert_eq!(summary.high_issues, 1);
        assert_eq!(summary.medium_issues, 2);
        assert_eq!(summary.low_issues, 1);
        assert_eq!(summary.info_issues, 1);
        assert_eq!(summary.rating(), "Needs Improvement");
    }

    #[test]
    fn rating_bands_follow_score() {
        let rated = |score: u8| ScanSummary { score, ..ScanSummary::default() }.rating();
        assert_eq!(rated(100), "Excellent");
        assert_eq!(rated(90), "Excellent");
        assert_eq!(rated(89), "Good");
        assert_eq!(rated(75), "Good");
        assert_eq!(rated(74), "Needs Improvement");
        assert_eq!(rated(50), "Needs Improvement");
        assert_eq!(rated(49), "Poor");
        assert_eq!(rated(0), "Poor");
    }

    #[test]
    fn score_is_floored_at_zero() {
        let report = report_with(&[FindingKind::SslError; 8]);
        let summary = ScanSummary::from_report(&report);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.rating(), "Poor");
    }

    #[test]
    fn clean_report_scores_full_marks() {
        let summary = ScanSummary::from_report(&report_with(&[]));
        assert_eq!(summary.score, 100);
        assert_eq!(summary.rating(), "Excellent");
    }

    #[test]
    fn invalid_input_keeps_app_idle() {
        let mut app = App::new();
        app.acknowledge_disclaimer();
        app.input = "ftp://example.com".to_string();
        assert!(app.begin_scan().is_none());
        assert_eq!(app.state, AppState::Idle);
        assert!(app.input_error.is_some());

        app.input = "example.com".to_string();
        let target = app.begin_scan().unwrap();
        assert_eq!(target.hostname(), "example.com");
        assert_eq!(app.state, AppState::Scanning);
        assert!(app.input_error.is_none());
    }

    #[test]
    fn selection_wraps_around() {
        let mut app = App::new();
        app.finish_scan(report_with(&[FindingKind::OpenPort, FindingKind::OpenPort, FindingKind::SslError]));
        assert_eq!(app.analysis_list_state.selected(), Some(0));

        app.select_previous();
        assert_eq!(app.analysis_list_state.selected(), Some(2));
        app.select_next();
        assert_eq!(app.analysis_list_state.selected(), Some(0));
        app.select_next();
        assert_eq!(app.selected_finding().map(Finding::kind), Some(FindingKind::OpenPort));
    }

    #[test]
    fn selection_on_empty_report_is_noop() {
        let mut app = App::new();
        app.finish_scan(report_with(&[]));
        app.select_next();
        assert_eq!(app.analysis_list_state.selected(), None);
    }

    #[test]
    fn export_writes_host_named_file() {
        let dir = std::env::temp_dir().join(format!("vanguard-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut app = App::new();
        app.input = "example.com".to_string();
        app.begin_scan().unwrap();
        app.finish_scan(report_with(&[FindingKind::OpenPort]));
        app.export_report(&dir);

        assert!(matches!(app.export_status, ExportStatus::Success(_)));
        let written = std::fs::read_to_string(dir.join("example.com_security_report.json")).unwrap();
        assert!(written.contains("\"open_port\""));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn export_without_report_is_an_error() {
        let mut app = App::new();
        app.export_report(Path::new("."));
        assert!(matches!(app.export_status, ExportStatus::Error(_)));
    }

    #[test]
    fn ipv6_host_is_sanitized_for_file_name() {
        let target = ScanTarget::parse("https://[::1]:8443").unwrap();
        assert_eq!(export_file_name(&target), PathBuf::from("__1_security_report.json"));
    }
}
