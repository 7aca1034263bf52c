//! Per-mode summary statistics over a normalized update trace.
//!
//! Updates are grouped by their rendering mode and five metric series are
//! pooled per group:
//!
//! - `latency` - delay between an update entering and leaving the queue
//! - `generation` - time to generate a single frame
//! - `generation_per_area` - generation time divided by the update's pixel
//!   area
//! - `vsync` - time to send a generated frame to the display
//! - `vsync_per_area` - vsync time divided by the update's pixel area
//!
//! Each series reports its arithmetic mean and sample standard deviation.
//! The pixel area divisor is per-record: it applies to every frame interval
//! of that record, not per frame.

pub mod summary;

pub use summary::{write_summary_csv, NoReferenceModeError, REFERENCE_MODE};

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use serde::Serialize;

use crate::trace::UpdateRecord;

/// Mean and sample standard deviation of one metric series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub stdev: f64,
}

/// The five summary metrics for one update mode, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeStats {
    pub latency: SeriesStats,
    pub generation: SeriesStats,
    pub generation_per_area: SeriesStats,
    pub vsync: SeriesStats,
    pub vsync_per_area: SeriesStats,
}

impl ModeStats {
    /// Metric names in the order they are emitted.
    pub const METRIC_NAMES: [&'static str; 5] = [
        "latency",
        "generation",
        "generation_per_area",
        "vsync",
        "vsync_per_area",
    ];

    /// The metrics paired with their names, in emission order.
    pub fn metrics(&self) -> [(&'static str, SeriesStats); 5] {
        [
            ("latency", self.latency),
            ("generation", self.generation),
            ("generation_per_area", self.generation_per_area),
            ("vsync", self.vsync),
            ("vsync_per_area", self.vsync_per_area),
        ]
    }
}

/// A metric series held fewer than the two samples a sample standard
/// deviation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsufficientSamplesError {
    pub mode: String,
    pub metric: &'static str,
    pub samples: usize,
}

impl fmt::Display for InsufficientSamplesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode {}: metric `{}` needs at least 2 samples, found {}",
            self.mode, self.metric, self.samples
        )
    }
}

impl std::error::Error for InsufficientSamplesError {}

/// Compute per-mode summary statistics for a full trace.
///
/// Modes are keyed exactly as they appear in the input; the map is complete
/// for every mode present. Any series with fewer than 2 samples fails with
/// [`InsufficientSamplesError`].
pub fn generate_stats(updates: &[UpdateRecord]) -> Result<BTreeMap<String, ModeStats>> {
    let mut groups: BTreeMap<&str, Vec<&UpdateRecord>> = BTreeMap::new();
    for update in updates {
        groups.entry(update.mode.as_str()).or_default().push(update);
    }

    let mut results = BTreeMap::new();
    for (mode, group) in groups {
        let mut latency = Vec::new();
        let mut generation = Vec::new();
        let mut generation_per_area = Vec::new();
        let mut vsync = Vec::new();
        let mut vsync_per_area = Vec::new();

        for update in group {
            let area = update.area() as f64;
            latency.extend(update.latencies().map(|value| value as f64));

            for span in &update.generate {
                let value = span.duration() as f64;
                generation.push(value);
                generation_per_area.push(value / area);
            }

            for span in &update.vsync {
                let value = span.duration() as f64;
                vsync.push(value);
                vsync_per_area.push(value / area);
            }
        }

        let stats = ModeStats {
            latency: series_stats(&latency, mode, "latency")?,
            generation: series_stats(&generation, mode, "generation")?,
            generation_per_area: series_stats(&generation_per_area, mode, "generation_per_area")?,
            vsync: series_stats(&vsync, mode, "vsync")?,
            vsync_per_area: series_stats(&vsync_per_area, mode, "vsync_per_area")?,
        };
        results.insert(mode.to_string(), stats);
    }

    Ok(results)
}

/// Mean and sample standard deviation (N-1 divisor) of a series.
fn series_stats(series: &[f64], mode: &str, metric: &'static str) -> Result<SeriesStats> {
    if series.len() < 2 {
        return Err(InsufficientSamplesError {
            mode: mode.to_string(),
            metric,
            samples: series.len(),
        }
        .into());
    }

    let count = series.len() as f64;
    let mean = series.iter().sum::<f64>() / count;
    let variance = series
        .iter()
        .map(|value| (value - mean) * (value - mean))
        .sum::<f64>()
        / (count - 1.0);

    Ok(SeriesStats {
        mean,
        stdev: variance.sqrt(),
    })
}

/// Round to `digits` significant digits (not decimal places): the value is
/// scaled by its order of magnitude first. Zero rounds to exactly zero for
/// any digit count.
pub fn round_signif(value: f64, digits: i32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits - 1 - magnitude);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TimeSpan;

    fn update(mode: &str, latency: i64, generate_ms: &[(i64, i64)]) -> UpdateRecord {
        UpdateRecord {
            ids: vec!["1".to_string()],
            mode: mode.to_string(),
            width: 100,
            height: 100,
            enqueue_times: vec![1000],
            dequeue_times: vec![1000 + latency],
            generate: generate_ms
                .iter()
                .map(|&(start, end)| TimeSpan::new(start, end))
                .collect(),
            vsync: vec![TimeSpan::new(9000, 9100), TimeSpan::new(9100, 9200)],
            ..Default::default()
        }
    }

    #[test]
    fn test_latency_mean_and_sample_stdev() {
        let updates = vec![
            update("A", 100, &[(2000, 3000), (3000, 4000)]),
            update("A", 200, &[(2000, 3000), (3000, 4000)]),
            update("A", 300, &[(2000, 3000), (3000, 4000)]),
        ];
        let stats = generate_stats(&updates).unwrap();
        let mode = &stats["A"];
        assert!((mode.latency.mean - 200.0).abs() < 1e-9);
        assert!((mode.latency.stdev - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_per_area_broadcast_divisor() {
        // 100x100 record, generation intervals of 2000 time units each:
        // every per-area sample is 2000 / 10000 = 0.2.
        let updates = vec![update("A", 100, &[(2000, 4000), (4000, 6000)]); 2];
        let stats = generate_stats(&updates).unwrap();
        let mode = &stats["A"];
        assert!((mode.generation_per_area.mean - 0.2).abs() < 1e-12);
        assert!((mode.generation.mean - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_per_area_stdev_is_real_stdev() {
        // Quotient samples 0.1 and 0.3: mean 0.2, sample stdev ~0.1414.
        let updates = vec![update("A", 100, &[(0, 1000), (5000, 8000)]); 2];
        let stats = generate_stats(&updates).unwrap();
        let per_area = stats["A"].generation_per_area;
        assert!((per_area.mean - 0.2).abs() < 1e-12);
        assert!((per_area.stdev - 0.11547005383792516).abs() < 1e-9);
        assert!((per_area.stdev - per_area.mean).abs() > 1e-3);
    }

    #[test]
    fn test_records_with_no_spans_contribute_nothing() {
        let mut empty = update("A", 100, &[]);
        empty.vsync = vec![TimeSpan::new(9000, 9100), TimeSpan::new(9100, 9200)];
        let updates = vec![
            empty,
            update("A", 200, &[(2000, 3000), (3000, 4000)]),
        ];
        let stats = generate_stats(&updates).unwrap();
        // Only the second record's two generation spans are pooled.
        assert!((stats["A"].generation.mean - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_samples_is_fatal() {
        let updates = vec![update("A", 100, &[(2000, 3000)])];
        let err = generate_stats(&updates).unwrap_err();
        let insufficient = err
            .downcast_ref::<InsufficientSamplesError>()
            .expect("expected InsufficientSamplesError");
        assert_eq!(insufficient.mode, "A");
        assert!(insufficient.samples < 2);
    }

    #[test]
    fn test_groups_keyed_by_input_mode_label() {
        let updates = vec![
            update("1", 100, &[(2000, 3000), (3000, 4000)]),
            update("0", 200, &[(2000, 3000), (3000, 4000)]),
            update("1", 300, &[(2000, 3000), (3000, 4000)]),
            update("0", 400, &[(2000, 3000), (3000, 4000)]),
        ];
        let stats = generate_stats(&updates).unwrap();
        assert_eq!(stats.len(), 2);
        assert!(stats.contains_key("0"));
        assert!(stats.contains_key("1"));
        assert!((stats["1"].latency.mean - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_signif_significant_digits() {
        assert_eq!(round_signif(0.0001234, 2), 0.00012);
        assert_eq!(round_signif(123456.0, 2), 120000.0);
        assert_eq!(round_signif(1999.9, 3), 2000.0);
    }

    #[test]
    fn test_round_signif_zero_is_zero() {
        for digits in [1, 2, 6, 12] {
            assert_eq!(round_signif(0.0, digits), 0.0);
        }
    }

    #[test]
    fn test_round_signif_negative() {
        assert_eq!(round_signif(-0.0001234, 2), -0.00012);
    }
}
