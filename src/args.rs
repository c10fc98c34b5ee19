// src/args.rs

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vanguard_recon::{ForbiddenPolicy, ScanConfig};

/// vanguard-recon: quick external triage of a web endpoint
#[derive(Parser, Debug)]
#[command(name = "vanguard-recon", version, about = "External reconnaissance scanner for web endpoints")]
pub struct Cli {
    /// Configuration file (TOML). Defaults to config.toml in the platform config directory.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan one target and print (or save) the JSON report
    Scan(ScanArgs),
    /// Serve the HTTP front end (POST /run_scan)
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:5000", value_name = "ADDR")]
        bind: SocketAddr,
        #[command(flatten)]
        overrides: ScanOverrides,
    },
    /// Interactive terminal UI (the default)
    Tui(ScanOverrides),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Host, domain or URL to scan (https:// is assumed when no scheme is given)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Write the report to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit single-line JSON
    #[arg(long)]
    pub compact: bool,

    #[command(flatten)]
    pub overrides: ScanOverrides,
}

/// Command-line values that take precedence over the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct ScanOverrides {
    /// Comma-separated ports for the open port check (e.g. 80,443,8080)
    #[arg(long, value_delimiter = ',', value_name = "PORTS")]
    pub ports: Option<Vec<u16>>,

    /// Comma-separated paths for the disclosure check (e.g. /.env,/.git/)
    #[arg(long, value_delimiter = ',', value_name = "PATHS")]
    pub paths: Option<Vec<String>>,

    /// Timeout in seconds for each TLS handshake and HTTP request
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Report 403 Forbidden on sensitive paths as exposure
    #[arg(long)]
    pub report_forbidden: bool,
}

impl ScanOverrides {
    pub fn apply(&self, config: &mut ScanConfig) {
        if let Some(ports) = &self.ports {
            config.ports = ports.clone();
        }
        if let Some(paths) = &self.paths {
            config.paths = paths.clone();
        }
        if let Some(secs) = self.timeout {
            config.tls_timeout_secs = secs;
            config.http_timeout_secs = secs;
        }
        if self.report_forbidden {
            config.forbidden_policy = ForbiddenPolicy::Report;
        }
    }
}
