// src/ui/widgets/input.rs
use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Renders the target input box. A rejected target shows its reason in the
/// border title until the next attempt.
pub fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_block = match &app.input_error {
        Some(error) => Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(format!("Target (host, domain or URL): {error}")),
        None => Block::default()
            .borders(Borders::ALL)
            .title("Target (host, domain or URL)"),
    };
    let input_paragraph = Paragraph::new(app.input.as_str())
        .block(input_block)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(input_paragraph, area);

    if app.state == AppState::Idle {
        frame.set_cursor_position((area.x + app.input.chars().count() as u16 + 1, area.y + 1));
    }
}
