// src/tui.rs

use std::io::{Stdout, stdout};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use vanguard_recon::{ScanReport, Scanner};

use crate::app::{App, AppState};
use crate::ui;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Runs the interactive UI until the user quits. The terminal is restored
/// even when the loop fails.
pub async fn run(scanner: Arc<Scanner>) -> Result<()> {
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, scanner).await;

    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    result
}

async fn event_loop(terminal: &mut Tui, scanner: Arc<Scanner>) -> Result<()> {
    let mut app = App::new();
    let (tx, mut rx) = mpsc::channel::<ScanReport>(1);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, &tx, &scanner)?;
        }

        if let Ok(report) = rx.try_recv() {
            app.finish_scan(report);
        }

        app.on_tick();
    }

    Ok(())
}

fn handle_events(app: &mut App, tx: &mpsc::Sender<ScanReport>, scanner: &Arc<Scanner>) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            match app.state {
                AppState::Disclaimer => match key.code {
                    KeyCode::Enter => app.acknowledge_disclaimer(),
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                    _ => {}
                },
                AppState::Idle => handle_idle_input(app, key.code, tx, scanner),
                AppState::Finished => handle_finished_input(app, key.code),
                AppState::Scanning => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        app.quit();
                    }
                }
            }
        }
    }
    Ok(())
}

/// Typing edits the target; `q` is a valid hostname character, so only Esc
/// quits from here.
fn handle_idle_input(
    app: &mut App,
    key_code: KeyCode,
    tx: &mpsc::Sender<ScanReport>,
    scanner: &Arc<Scanner>,
) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Enter => {
            let Some(target) = app.begin_scan() else {
                return;
            };
            let tx = tx.clone();
            let scanner = Arc::clone(scanner);
            tokio::spawn(async move {
                let findings = scanner.execute(&target).await;
                let _ = tx.send(ScanReport::new(&target, findings)).await;
            });
        }
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('e') => app.export_report(Path::new(".")),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        _ => {}
    }
}
