// src/ui/widgets/mod.rs

pub mod analysis_view; // Findings list with the detail pane.
pub mod disclaimer_popup;
pub mod footer; // Key hints and export status.
pub mod input;
pub mod summary; // Score, gauge and counts per severity.
