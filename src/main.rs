//! frametrace: Analyze and visualize rendering pipeline update traces
//!
//! This tool parses CSV update traces, computes per-mode summary statistics
//! and renders static SVG or interactive HTML timelines.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use frametrace::render::{render_plot, render_report, ReportAssets};
use frametrace::stats::generate_stats;
use frametrace::stats::summary::{summary_columns, summary_rows};
use frametrace::trace::{parse_updates_csv, UpdateRecord};

const PLOT_STYLESHEET: &str = include_str!("render/assets/plot.css");
const REPORT_STYLESHEET: &str = include_str!("render/assets/report.css");
const REPORT_SCRIPT: &str = include_str!("render/assets/report.js");

#[derive(Parser)]
#[command(name = "frametrace")]
#[command(about = "Analyze and visualize rendering pipeline update traces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-mode summary statistics from a trace
    Stats {
        /// Path to the trace CSV (reads stdin if omitted)
        input: Option<PathBuf>,

        /// Path to write the summary to (writes stdout if omitted)
        output: Option<PathBuf>,

        /// Output format: csv, json, table
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Render a trace as a static SVG timeline plot
    Plot {
        /// Path to the trace CSV (reads stdin if omitted)
        input: Option<PathBuf>,

        /// Path to write the SVG to (writes stdout if omitted)
        output: Option<PathBuf>,
    },

    /// Render a trace as an interactive HTML timeline report
    Report {
        /// Path to the trace CSV (reads stdin if omitted)
        input: Option<PathBuf>,

        /// Path to write the HTML to (writes stdout if omitted)
        output: Option<PathBuf>,
    },
}

/// Parse the trace from a file or stdin.
fn read_updates(input: Option<&Path>) -> Result<Vec<UpdateRecord>> {
    let updates = match input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open trace {}", path.display()))?;
            parse_updates_csv(file)
        }
        None => parse_updates_csv(io::stdin().lock()),
    }?;
    eprintln!("{} updates parsed", updates.len());
    Ok(updates)
}

/// Write a fully rendered artifact to a file or stdout.
///
/// Output is only opened once rendering has succeeded, so a failed run
/// never leaves a partial artifact behind.
fn write_artifact(output: Option<&Path>, data: &str) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            file.write_all(data.as_bytes())?;
        }
        None => io::stdout().write_all(data.as_bytes())?,
    }
    Ok(())
}

/// Run the stats command
fn run_stats(input: Option<PathBuf>, output: Option<PathBuf>, format: String) -> Result<()> {
    let updates = read_updates(input.as_deref())?;
    let stats = generate_stats(&updates)?;

    let rendered = match format.as_str() {
        "csv" => {
            let columns = summary_columns(&stats)?;
            let mut text = String::new();
            text.push_str(&columns.join(","));
            text.push('\n');
            for row in summary_rows(&stats) {
                text.push_str(&row.join(","));
                text.push('\n');
            }
            text
        }
        "json" => {
            let mut text = serde_json::to_string_pretty(&stats)?;
            text.push('\n');
            text
        }
        "table" => {
            let columns = summary_columns(&stats)?;
            format_table(&columns, &summary_rows(&stats))
        }
        other => bail!("Unknown format: {other} (expected csv, json or table)"),
    };

    write_artifact(output.as_deref(), &rendered)?;
    eprintln!("{} modes summarized", stats.len());
    Ok(())
}

/// Run the plot command
fn run_plot(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let updates = read_updates(input.as_deref())?;
    let svg = render_plot(&updates, PLOT_STYLESHEET)?;
    write_artifact(output.as_deref(), &svg)
}

/// Run the report command
fn run_report(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let updates = read_updates(input.as_deref())?;
    let assets = ReportAssets {
        stylesheet: REPORT_STYLESHEET,
        script: REPORT_SCRIPT,
    };
    let html = render_report(&updates, &assets)?;
    write_artifact(output.as_deref(), &html)
}

const MAX_COLUMN_WIDTH: usize = 50;

fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in rows {
        for (i, val) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(val.len());
            }
        }
    }

    for w in &mut widths {
        *w = (*w).min(MAX_COLUMN_WIDTH);
    }

    let mut text = String::new();

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths.get(i).copied().unwrap_or(10)))
        .collect();
    text.push_str(&header_line.join(" | "));
    text.push('\n');

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    text.push_str(&sep.join("-+-"));
    text.push('\n');

    for row in rows {
        let row_line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let width = widths.get(i).copied().unwrap_or(10);
                let truncated = if v.len() > width && width > 3 {
                    format!("{}...", &v[..width.saturating_sub(3)])
                } else {
                    v.clone()
                };
                format!("{truncated:width$}")
            })
            .collect();
        text.push_str(&row_line.join(" | "));
        text.push('\n');
    }

    text
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats {
            input,
            output,
            format,
        } => run_stats(input, output, format),
        Commands::Plot { input, output } => run_plot(input, output),
        Commands::Report { input, output } => run_report(input, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table_aligns_columns() {
        let headers = vec!["mode".to_string(), "latency_mean".to_string()];
        let rows = vec![
            vec!["0".to_string(), "123.457".to_string()],
            vec!["1".to_string(), "98".to_string()],
        ];
        let text = format_table(&headers, &rows);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "mode | latency_mean");
        assert_eq!(lines[1], "-----+-------------");
        assert_eq!(lines[2], "0    | 123.457     ");
        assert_eq!(lines[3], "1    | 98          ");
    }

    #[test]
    fn test_format_table_truncates_wide_values() {
        let headers = vec!["mode".to_string()];
        let rows = vec![vec!["x".repeat(80)]];
        let text = format_table(&headers, &rows);
        let data_line = text.lines().nth(2).unwrap();
        assert_eq!(data_line.len(), MAX_COLUMN_WIDTH);
        assert!(data_line.ends_with("..."));
    }
}
