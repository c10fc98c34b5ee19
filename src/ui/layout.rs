// src/ui/layout.rs

use ratatui::layout::{Constraint, Layout, Rect};

/// The screen areas of the terminal UI, computed once per frame.
pub struct AppLayout {
    pub input: Rect,
    pub report: Rect,
    pub summary: Rect,
    pub footer: Rect,
}

/// Input bar on top, key hints at the bottom, and the findings report beside
/// the summary in between.
pub fn create_layout(area: Rect) -> AppLayout {
    let [input, content, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [report, summary] =
        Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)]).areas(content);

    AppLayout {
        input,
        report,
        summary,
        footer,
    }
}
