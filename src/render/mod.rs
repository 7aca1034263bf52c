//! Timeline rendering for normalized update traces.
//!
//! Two output formats share one layout: one fixed-height row per update in
//! input order, alternating background shades, vertical gridlines at a
//! fixed absolute time spacing, and per-update shapes for the queue,
//! generation and vsync phases. The static SVG plot bakes the zoom factor
//! into every coordinate; the interactive HTML report additionally stamps
//! raw timestamps onto each shape as `data-*` attributes so its embedded
//! script can rescale all positions from a live zoom control without a
//! re-render.
//!
//! Style and behavior text are opaque blobs supplied by the caller; the
//! renderers never load assets themselves.

pub mod plot;
pub mod report;

// Re-export for convenience
pub use plot::{render_plot, TIME_MARGIN};
pub use report::{render_report, ReportAssets};

use anyhow::{bail, Result};

use crate::trace::UpdateRecord;

/// Pixels per trace time unit at the default zoom.
pub const INITIAL_ZOOM: f64 = 0.000_1;

/// Absolute spacing of vertical time gridlines, in trace time units.
pub const TIME_TICK_SPACE: i64 = 1_000_000;

/// Height of one update row, in pixels.
pub const UPDATE_ROW_HEIGHT: f64 = 10.0;

/// Mapping from trace timestamps to horizontal pixel positions.
///
/// `start_time` is the earliest enqueue across the trace and `end_time` the
/// latest recorded phase end, each widened by the caller's margin. Any
/// timestamp maps to `(t - start_time) * zoom` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TimeScale {
    pub start_time: i64,
    pub end_time: i64,
    pub zoom: f64,
}

impl TimeScale {
    /// Build the scale covering every record, widened by `margin` time
    /// units on both ends. Fails on a trace with no timed updates, which
    /// has no meaningful window to draw.
    pub fn from_records(updates: &[UpdateRecord], margin: i64, zoom: f64) -> Result<Self> {
        let start = updates.iter().filter_map(UpdateRecord::start_time).min();
        let end = updates.iter().filter_map(UpdateRecord::end_time).max();
        match (start, end) {
            (Some(start), Some(end)) => Ok(TimeScale {
                start_time: start - margin,
                end_time: end + margin,
                zoom,
            }),
            _ => bail!("trace contains no timed updates to lay out"),
        }
    }

    /// Horizontal pixel position of an absolute timestamp.
    pub fn x(&self, time: i64) -> f64 {
        (time - self.start_time) as f64 * self.zoom
    }

    /// Pixel width of the interval between two timestamps.
    pub fn span_width(&self, start: i64, end: i64) -> f64 {
        (end - start) as f64 * self.zoom
    }

    /// Pixel width of the whole drawable window.
    pub fn total_width(&self) -> f64 {
        self.span_width(self.start_time, self.end_time)
    }

    /// Gridline timestamps at fixed absolute spacing, independent of
    /// record boundaries.
    pub fn ticks(&self) -> impl Iterator<Item = i64> {
        (self.start_time..self.end_time).step_by(TIME_TICK_SPACE as usize)
    }
}

/// Duration label in milliseconds, e.g. `"1.5 ms"`.
pub(crate) fn millis(start: i64, end: i64) -> String {
    format!("{} ms", (end - start) as f64 / 1_000.0)
}

/// Tooltip for one queue-wait interval.
pub(crate) fn queue_label(id: &str, enqueue: i64, dequeue: i64) -> String {
    format!("Update #{}: {} in queue", id, millis(enqueue, dequeue))
}

/// Tooltip for one generation interval.
pub(crate) fn generate_label(frame: usize, start: i64, end: i64) -> String {
    format!("Generation of frame #{}: {}", frame, millis(start, end))
}

/// Tooltip for one vsync interval.
pub(crate) fn vsync_label(frame: usize, start: i64, end: i64) -> String {
    format!("Vsync of frame #{}: {}", frame, millis(start, end))
}

/// Two-shade alternation by index parity.
pub(crate) fn parity(index: usize) -> &'static str {
    if index % 2 == 0 {
        "even"
    } else {
        "odd"
    }
}

/// Escape text for interpolation into a markup attribute or text node.
/// Update ids and modes are opaque trace tokens and cannot be trusted to
/// be markup-safe.
pub(crate) fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
