// src/ui/widgets/footer.rs

use crate::app::{App, AppState, ExportStatus};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Renders the footer widget, which displays available actions.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = |label: &'static str| Span::styled(label, Style::new().bold().fg(Color::Yellow));

    let line = match app.state {
        AppState::Disclaimer => Line::from(vec![
            Span::raw("Press "),
            key("Enter"),
            Span::raw(" to acknowledge, "),
            key("Q"),
            Span::raw(" to quit."),
        ]),
        AppState::Idle => Line::from(vec![
            Span::raw("Press "),
            key("Enter"),
            Span::raw(" to scan, "),
            key("Esc"),
            Span::raw(" to quit."),
        ]),
        AppState::Finished => {
            let mut spans = vec![
                key("[N]"),
                Span::raw("ew Scan, "),
                key("[E]"),
                Span::raw("xport, "),
                key("[Q]"),
                Span::raw("uit"),
            ];
            match &app.export_status {
                ExportStatus::Idle => {}
                ExportStatus::Success(message) => {
                    spans.push(Span::raw("  |  "));
                    spans.push(Span::styled(message.clone(), Style::new().fg(Color::Green)));
                }
                ExportStatus::Error(message) => {
                    spans.push(Span::raw("  |  "));
                    spans.push(Span::styled(message.clone(), Style::new().fg(Color::Red)));
                }
            }
            Line::from(spans)
        }
        AppState::Scanning => Line::from("Scanning... Press Q to quit."),
    };

    let footer = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
