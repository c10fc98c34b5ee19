// src/lib.rs

//! External reconnaissance scanner for web endpoints.
//!
//! A scan runs a fixed battery of independent probes (TLS posture, security
//! headers, common open ports, predictable sensitive paths) against one
//! target and aggregates their findings into a [`ScanReport`].

pub mod core;
pub mod logging;
pub mod server;

pub use crate::core::config::{ForbiddenPolicy, ScanConfig};
pub use crate::core::models::{Finding, FindingKind, ScanTarget, Severity, TargetError};
pub use crate::core::report::{ReportSummary, ScanReport};
pub use crate::core::scanner::{Probe, Scanner};
