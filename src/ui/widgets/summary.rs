// src/ui/widgets/summary.rs

use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};

/// Renders the summary panel: overall score with its rating, a gauge, and
/// the number of findings per severity. Empty until a scan has finished.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Score & rating
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(5), // Issues by severity
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Target
        ])
        .split(area);

    if app.state != AppState::Finished {
        return;
    }

    let score = app.summary.score;
    let score_color = match score {
        90..=100 => Color::Green,
        75..=89 => Color::Cyan,
        50..=74 => Color::Yellow,
        _ => Color::Red,
    };
    let score_line = Line::from(format!("{}/100 ({})", score, app.summary.rating()))
        .style(Style::default().fg(score_color));
    let score_text = Text::from(vec![Line::from("Overall Score".bold()), score_line]);
    frame.render_widget(
        Paragraph::new(score_text).alignment(Alignment::Center),
        summary_chunks[0],
    );

    let score_gauge = Gauge::default()
        .percent(u16::from(score))
        .label("")
        .gauge_style(Style::default().fg(score_color));
    frame.render_widget(score_gauge, summary_chunks[1]);

    let count_line = |label: &'static str, count: usize, color: Color| {
        Line::from(vec![
            Span::raw(label),
            Span::styled(count.to_string(), Style::default().fg(color)),
        ])
    };
    let issues = Text::from(vec![
        count_line("High:   ", app.summary.high_issues, Color::Red),
        count_line("Medium: ", app.summary.medium_issues, Color::Yellow),
        count_line("Low:    ", app.summary.low_issues, Color::Cyan),
        count_line("Info:   ", app.summary.info_issues, Color::DarkGray),
    ]);
    let issues_block = Block::default().title("ISSUES FOUND".bold());
    frame.render_widget(Paragraph::new(issues).block(issues_block), summary_chunks[3]);

    if let Some(report) = &app.scan_report {
        let target_text = Text::from(vec![
            Line::from("TARGET".bold()),
            Line::from(report.scan_target()),
            Line::from(report.scan_time().format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .style(Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(target_text), summary_chunks[5]);
    }
}
