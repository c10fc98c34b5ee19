// src/core/mod.rs

/// Finding model, severities and target normalization.
pub mod models;

/// Probe implementations and the orchestrator that runs them.
pub mod scanner;

/// The static table of finding kinds: severity, explanation, remediation.
pub mod knowledge_base;

/// Aggregation of findings into the serialized report.
pub mod report;

/// Scan tunables and their TOML loading.
pub mod config;
