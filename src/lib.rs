//! Frametrace library - shared modules for the frametrace binary.
//!
//! This library turns CSV update traces captured from a rendering pipeline
//! into summary statistics and timeline visualizations.
//!
//! # Modules
//!
//! - [`trace`] - Normalized update records and the CSV trace parser
//! - [`stats`] - Per-mode summary statistics over a normalized trace
//! - [`render`] - Static SVG plot and interactive HTML report renderers
//!
//! # Example
//!
//! ```no_run
//! use frametrace::stats::generate_stats;
//! use frametrace::trace::parse_updates_csv;
//! use std::fs::File;
//!
//! let input = File::open("trace.csv").expect("Failed to open trace");
//! let updates = parse_updates_csv(input).expect("Failed to parse trace");
//! let stats = generate_stats(&updates).expect("Failed to compute stats");
//! for (mode, mode_stats) in &stats {
//!     println!("mode {mode}: mean latency {}", mode_stats.latency.mean);
//! }
//! ```

pub mod render;
pub mod stats;
pub mod trace;

// Re-export for convenience
pub use render::{render_plot, render_report, ReportAssets};
pub use stats::{generate_stats, write_summary_csv, ModeStats, SeriesStats};
pub use trace::{parse_updates_csv, TimeSpan, UpdateRecord};
