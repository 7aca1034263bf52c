//! Summary table emission for per-mode statistics.
//!
//! The CSV layout is one header row `mode,<metric>_<stat>,...` followed by
//! one row per mode. The column order is fixed by the metric order of the
//! reference mode's stats so that it stays stable across runs; a trace that
//! never used the reference mode cannot be emitted as CSV.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use anyhow::Result;

use super::{round_signif, ModeStats};

/// Mode whose metric ordering fixes the summary column order.
pub const REFERENCE_MODE: &str = "0";

/// Significant digits kept in emitted summary values.
pub const SUMMARY_SIGNIF_DIGITS: i32 = 6;

/// Summary emission could not fix its column order because the reference
/// mode is absent from the trace.
///
/// This only blocks emission; the in-memory statistics map is complete for
/// every mode that is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoReferenceModeError {
    pub reference: String,
}

impl fmt::Display for NoReferenceModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot fix summary column order: trace contains no mode {:?} updates",
            self.reference
        )
    }
}

impl std::error::Error for NoReferenceModeError {}

/// Header cells for the summary, derived from the reference mode's metric
/// order.
pub fn summary_columns(stats: &BTreeMap<String, ModeStats>) -> Result<Vec<String>> {
    let reference = stats.get(REFERENCE_MODE).ok_or_else(|| NoReferenceModeError {
        reference: REFERENCE_MODE.to_string(),
    })?;

    let mut columns = vec!["mode".to_string()];
    for (name, _) in reference.metrics() {
        columns.push(format!("{name}_mean"));
        columns.push(format!("{name}_stdev"));
    }
    Ok(columns)
}

/// Data cells for the summary, one row per mode, rounded to
/// [`SUMMARY_SIGNIF_DIGITS`] significant digits.
pub fn summary_rows(stats: &BTreeMap<String, ModeStats>) -> Vec<Vec<String>> {
    stats
        .iter()
        .map(|(mode, data)| {
            let mut row = vec![mode.clone()];
            for (_, series) in data.metrics() {
                row.push(round_signif(series.mean, SUMMARY_SIGNIF_DIGITS).to_string());
                row.push(round_signif(series.stdev, SUMMARY_SIGNIF_DIGITS).to_string());
            }
            row
        })
        .collect()
}

/// Write the summary as CSV.
pub fn write_summary_csv<W: Write>(
    stats: &BTreeMap<String, ModeStats>,
    out: &mut W,
) -> Result<()> {
    let columns = summary_columns(stats)?;
    writeln!(out, "{}", columns.join(","))?;
    for row in summary_rows(stats) {
        writeln!(out, "{}", row.join(","))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ModeStats, SeriesStats};

    fn mode_stats(base: f64) -> ModeStats {
        let series = |mean, stdev| SeriesStats { mean, stdev };
        ModeStats {
            latency: series(base, 1.0),
            generation: series(base * 2.0, 2.0),
            generation_per_area: series(base / 10000.0, 0.0001),
            vsync: series(base * 3.0, 3.0),
            vsync_per_area: series(base * 3.0 / 10000.0, 0.0003),
        }
    }

    fn stats_map(modes: &[&str]) -> BTreeMap<String, ModeStats> {
        modes
            .iter()
            .enumerate()
            .map(|(pos, mode)| (mode.to_string(), mode_stats(100.0 * (pos + 1) as f64)))
            .collect()
    }

    #[test]
    fn test_csv_layout() {
        let stats = stats_map(&["0", "1"]);
        let mut out = Vec::new();
        write_summary_csv(&stats, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "mode,latency_mean,latency_stdev,generation_mean,generation_stdev,\
generation_per_area_mean,generation_per_area_stdev,vsync_mean,vsync_stdev,\
vsync_per_area_mean,vsync_per_area_stdev"
        );
        assert!(lines[1].starts_with("0,100,"));
        assert!(lines[2].starts_with("1,200,"));
    }

    #[test]
    fn test_missing_reference_mode_fails() {
        let stats = stats_map(&["1", "2"]);
        let mut out = Vec::new();
        let err = write_summary_csv(&stats, &mut out).unwrap_err();
        let missing = err
            .downcast_ref::<NoReferenceModeError>()
            .expect("expected NoReferenceModeError");
        assert_eq!(missing.reference, "0");
        assert!(out.is_empty());
    }

    #[test]
    fn test_values_rounded_to_significant_digits() {
        let mut stats = stats_map(&["0"]);
        if let Some(entry) = stats.get_mut("0") {
            entry.latency.mean = 123.456789;
            entry.latency.stdev = 0.000123456789;
        }
        let rows = summary_rows(&stats);
        assert_eq!(rows[0][1], "123.457");
        assert_eq!(rows[0][2], "0.000123457");
    }
}
