// src/main.rs

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use vanguard_recon::{ScanConfig, Scanner, logging, server};

mod app;
mod args;
mod tui;
mod ui;

use args::{Cli, Command, ScanArgs, ScanOverrides};

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // The TUI owns the terminal, so it only logs to file.
    let interactive = matches!(cli.command, None | Some(Command::Tui(_)));
    let log_path = logging::initialize_logging(!interactive)?;
    tracing::debug!(path = %log_path.display(), "Logging initialized.");

    let runtime = tokio::runtime::Runtime::new().wrap_err("Failed to start the async runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or_else(|| Command::Tui(ScanOverrides::default()));

    match command {
        Command::Scan(args) => {
            let config = resolve_config(cli.config.as_deref(), &args.overrides)?;
            run_scan(args, config).await
        }
        Command::Serve { bind, overrides } => {
            let config = resolve_config(cli.config.as_deref(), &overrides)?;
            let scanner = Arc::new(Scanner::new(config));
            server::start_server(bind, scanner)
                .await
                .wrap_err_with(|| format!("HTTP front end failed on {bind}"))
        }
        Command::Tui(overrides) => {
            let config = resolve_config(cli.config.as_deref(), &overrides)?;
            tui::run(Arc::new(Scanner::new(config))).await
        }
    }
}

/// File (or defaults), then command-line overrides, then validation.
fn resolve_config(path: Option<&Path>, overrides: &ScanOverrides) -> Result<ScanConfig> {
    let mut config = ScanConfig::load(path)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run_scan(args: ScanArgs, config: ScanConfig) -> Result<()> {
    let scanner = Scanner::new(config);
    let report = scanner
        .scan(&args.target)
        .await
        .wrap_err_with(|| format!("Invalid scan target '{}'", args.target))?;
    tracing::info!(
        target = %report.scan_target(),
        findings = report.summary().total_findings(),
        high = report.summary().high_severity(),
        "Scan finished."
    );

    let json = report.to_json(!args.compact)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .wrap_err_with(|| format!("Failed to write report to {}", path.display()))?;
            println!("Report saved to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
