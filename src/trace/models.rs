//! Trace data model structs shared between parsing, statistics and rendering.
//!
//! These structs are the canonical in-memory format for update traces. Both
//! wire schemas (the legacy single-update rows and the newer batch rows) are
//! normalized into [`UpdateRecord`] at parse time, so everything downstream
//! is schema-agnostic.

/// One closed time interval on the trace clock.
///
/// All timestamps in a trace share a single monotonic integer clock domain;
/// the unit is whatever the producing instrumentation used (microseconds in
/// practice), consistent across the whole trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: i64,
    pub end: i64,
}

impl TimeSpan {
    pub fn new(start: i64, end: i64) -> Self {
        TimeSpan { start, end }
    }

    /// Length of the interval in trace time units.
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

/// One logical screen-content update, or a merged batch of updates that
/// shared a dequeue slot.
///
/// # Fields
/// - `ids`: identifiers of the merged updates; usually one, more when
///   several queued updates were coalesced before dequeue
/// - `mode`: rendering mode label, the statistics grouping key
/// - `immediate`: whether the update was processed in immediate mode
///   (batch-schema flag; always false for legacy single-update rows)
/// - `width`, `height`: pixel dimensions of the updated region
/// - `enqueue_times`, `dequeue_times`: one entry per id; each pair is a
///   queue-wait interval
/// - `generate`: per-frame generation intervals
/// - `vsync`: per-frame present intervals
///
/// Within a record timestamps are non-decreasing across phases
/// (enqueue <= dequeue <= generation <= vsync); the producer is trusted to
/// uphold this and the parser does not re-verify it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateRecord {
    pub ids: Vec<String>,
    pub mode: String,
    pub immediate: bool,
    pub width: u32,
    pub height: u32,
    pub enqueue_times: Vec<i64>,
    pub dequeue_times: Vec<i64>,
    pub generate: Vec<TimeSpan>,
    pub vsync: Vec<TimeSpan>,
}

impl UpdateRecord {
    /// Pixel area of the updated region, the per-area normalization divisor.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Earliest enqueue time, or `None` for a record with no queue entries.
    pub fn start_time(&self) -> Option<i64> {
        self.enqueue_times.iter().copied().min()
    }

    /// Last recorded timestamp for this update: the final vsync end, or the
    /// final generation end when no vsync was recorded, or the last dequeue
    /// time for an update that never produced a frame.
    pub fn end_time(&self) -> Option<i64> {
        self.vsync
            .last()
            .or_else(|| self.generate.last())
            .map(|span| span.end)
            .or_else(|| self.dequeue_times.last().copied())
    }

    /// Queue-wait durations, one per merged update.
    pub fn latencies(&self) -> impl Iterator<Item = i64> + '_ {
        self.enqueue_times
            .iter()
            .zip(self.dequeue_times.iter())
            .map(|(enqueue, dequeue)| dequeue - enqueue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UpdateRecord {
        UpdateRecord {
            ids: vec!["12".to_string(), "13".to_string()],
            mode: "2".to_string(),
            width: 100,
            height: 50,
            enqueue_times: vec![1000, 1100],
            dequeue_times: vec![1500, 1500],
            generate: vec![TimeSpan::new(1600, 1900), TimeSpan::new(1900, 2300)],
            vsync: vec![TimeSpan::new(2400, 2700)],
            ..Default::default()
        }
    }

    #[test]
    fn test_area() {
        assert_eq!(record().area(), 5000);
    }

    #[test]
    fn test_start_is_earliest_enqueue() {
        assert_eq!(record().start_time(), Some(1000));
    }

    #[test]
    fn test_end_prefers_vsync() {
        assert_eq!(record().end_time(), Some(2700));
    }

    #[test]
    fn test_end_falls_back_to_generate() {
        let mut update = record();
        update.vsync.clear();
        assert_eq!(update.end_time(), Some(2300));
    }

    #[test]
    fn test_end_falls_back_to_dequeue() {
        let mut update = record();
        update.vsync.clear();
        update.generate.clear();
        assert_eq!(update.end_time(), Some(1500));
    }

    #[test]
    fn test_latencies_per_merged_update() {
        let latencies: Vec<i64> = record().latencies().collect();
        assert_eq!(latencies, vec![500, 400]);
    }
}
