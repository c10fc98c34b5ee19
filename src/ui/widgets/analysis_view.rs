// src/ui/widgets/analysis_view.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use vanguard_recon::Severity;
use vanguard_recon::core::knowledge_base;

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::High => Style::default().fg(Color::Red),
        Severity::Medium => Style::default().fg(Color::Yellow),
        Severity::Low => Style::default().fg(Color::Cyan),
        Severity::Info => Style::default().fg(Color::DarkGray),
    }
}

pub fn render_analysis_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default()
        .borders(Borders::ALL)
        .title("Analysis Report (Navigate with ↑ ↓)");

    if app.state != AppState::Finished {
        let content = match app.state {
            AppState::Scanning => {
                let spinner_char = SPINNER_CHARS[app.spinner_frame % SPINNER_CHARS.len()];
                Paragraph::new(Line::from(vec![
                    Span::styled(format!("{spinner_char} "), Style::default().fg(Color::Cyan)),
                    Span::raw("Scanning... Please wait."),
                ]))
            }
            _ => Paragraph::new("Scan results will appear here..."),
        };
        frame.render_widget(content.alignment(Alignment::Center).block(main_block), area);
        return;
    }

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Min(0)])
        .split(inner_area);

    let items: Vec<ListItem> = app
        .findings()
        .iter()
        .map(|finding| {
            let (category, title) = match knowledge_base::get_finding_detail(finding.kind()) {
                Some(detail) => (detail.category.to_string(), detail.title),
                None => (String::new(), "Unknown Finding"),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{category}] "), Style::default().fg(Color::DarkGray)),
                Span::styled(title, severity_style(finding.severity())),
            ]))
        })
        .collect();

    let findings_list = List::new(items)
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(findings_list, chunks[0], &mut app.analysis_list_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    let selected = app.selected_finding().and_then(|finding| {
        knowledge_base::get_finding_detail(finding.kind())
            .map(|detail| (finding.description().to_string(), finding.severity(), detail))
    });

    match selected {
        Some((description, severity, detail)) => {
            let text = vec![
                Line::from(vec![
                    Span::styled(format!("{severity} "), severity_style(severity).add_modifier(Modifier::BOLD)),
                    Span::raw(description),
                ]),
                Line::from(""),
                Line::from("WHAT IT IS:".yellow().bold()),
                Line::from(detail.explanation),
                Line::from(""),
                Line::from("HOW TO FIX:".yellow().bold()),
                Line::from(detail.remediation),
            ];
            let p = Paragraph::new(text).wrap(Wrap { trim: true }).block(detail_block);
            frame.render_widget(p, chunks[1]);
        }
        None => render_placeholder_details(frame, app, detail_block, chunks[1]),
    }
}

fn render_placeholder_details(frame: &mut Frame, app: &App, block: Block, area: Rect) {
    let placeholder_text = if app.findings().is_empty() {
        Text::from(vec![
            Line::from(""),
            Line::from("✓ NO FINDINGS".bold().fg(Color::Green)),
            Line::from(""),
            Line::from("None of the checks reported an issue for this target."),
        ])
    } else {
        Text::from("Select an item above to see details.")
    };

    let p = Paragraph::new(placeholder_text).alignment(Alignment::Center).block(block);
    frame.render_widget(p, area);
}
