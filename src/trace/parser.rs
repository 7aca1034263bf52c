//! CSV trace parser and normalizer.
//!
//! Traces come in two header-labeled CSV schemas, depending on the version
//! of the instrumentation that produced them:
//!
//! - *single-update*: `id,mode,width,height,queue_time,dequeue_time,`
//!   `generate_times,vsync_times`, where the two `*_times` columns are
//!   `:`-joined timestamp lists and consecutive pairs delimit per-frame
//!   intervals;
//! - *batch*: `id,mode,immediate,width,height,enqueue_times,dequeue_times,`
//!   `generate_start_times,generate_end_times,vsync_start_times,`
//!   `vsync_end_times`, where every list column is `:`-joined and the
//!   start/end columns zip into per-frame intervals.
//!
//! Both shapes normalize into the same [`UpdateRecord`] here, once, so the
//! statistics and rendering paths never see the difference. Rows are
//! independent and come out in input order; any malformed field aborts the
//! parse, since downstream statistics assume a complete trace.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use anyhow::{bail, Context, Result};
use csv::StringRecord;

use crate::trace::models::{TimeSpan, UpdateRecord};

/// Separator used inside CSV fields that hold timestamp or id lists.
const LIST_SEPARATOR: char = ':';

/// A trace field that failed parsing: non-numeric content in an integer
/// column, an invalid flag value, or a required column missing entirely.
///
/// Fatal for the whole run; a malformed row means a corrupt trace, not a
/// recoverable event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedFieldError {
    /// 1-based line in the source stream (1 is the header line).
    pub line: u64,
    /// Column name as it appears in the header.
    pub field: String,
    /// Offending field content, or a placeholder for a missing column.
    pub value: String,
}

impl fmt::Display for MalformedFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: malformed field `{}`: {:?}",
            self.line, self.field, self.value
        )
    }
}

impl std::error::Error for MalformedFieldError {}

/// Parse a complete update trace from a CSV stream.
///
/// The header row selects the schema; every data row becomes one
/// [`UpdateRecord`], in input order.
pub fn parse_updates_csv<R: Read>(input: R) -> Result<Vec<UpdateRecord>> {
    let mut reader = csv::ReaderBuilder::new().from_reader(input);
    let headers = reader
        .headers()
        .context("failed to read trace header")?
        .clone();
    let schema = Schema::detect(&headers)?;

    let mut updates = Vec::new();
    for row in reader.records() {
        let row = row.context("failed to read trace row")?;
        let line = row.position().map_or(0, |pos| pos.line());
        updates.push(schema.parse_row(&row, line)?);
    }

    Ok(updates)
}

/// Column indexes for one of the two recognized trace schemas.
enum Schema {
    Single {
        id: usize,
        mode: usize,
        width: usize,
        height: usize,
        queue_time: usize,
        dequeue_time: usize,
        generate_times: usize,
        vsync_times: usize,
    },
    Batch {
        id: usize,
        mode: usize,
        immediate: usize,
        width: usize,
        height: usize,
        enqueue_times: usize,
        dequeue_times: usize,
        generate_start_times: usize,
        generate_end_times: usize,
        vsync_start_times: usize,
        vsync_end_times: usize,
    },
}

impl Schema {
    /// Pick the schema from the header row and resolve all required column
    /// indexes, failing on any missing column.
    fn detect(headers: &StringRecord) -> Result<Self> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(pos, name)| (name, pos))
            .collect();

        let column = |name: &str| -> Result<usize> {
            index.get(name).copied().ok_or_else(|| {
                MalformedFieldError {
                    line: 1,
                    field: name.to_string(),
                    value: "<missing column>".to_string(),
                }
                .into()
            })
        };

        if index.contains_key("enqueue_times") {
            Ok(Schema::Batch {
                id: column("id")?,
                mode: column("mode")?,
                immediate: column("immediate")?,
                width: column("width")?,
                height: column("height")?,
                enqueue_times: column("enqueue_times")?,
                dequeue_times: column("dequeue_times")?,
                generate_start_times: column("generate_start_times")?,
                generate_end_times: column("generate_end_times")?,
                vsync_start_times: column("vsync_start_times")?,
                vsync_end_times: column("vsync_end_times")?,
            })
        } else if index.contains_key("queue_time") {
            Ok(Schema::Single {
                id: column("id")?,
                mode: column("mode")?,
                width: column("width")?,
                height: column("height")?,
                queue_time: column("queue_time")?,
                dequeue_time: column("dequeue_time")?,
                generate_times: column("generate_times")?,
                vsync_times: column("vsync_times")?,
            })
        } else {
            bail!(
                "unrecognized trace header {:?}: expected a single-update or batch update trace",
                headers
            );
        }
    }

    fn parse_row(&self, row: &StringRecord, line: u64) -> Result<UpdateRecord> {
        match *self {
            Schema::Single {
                id,
                mode,
                width,
                height,
                queue_time,
                dequeue_time,
                generate_times,
                vsync_times,
            } => {
                let generate = parse_time_list(field(row, generate_times), "generate_times", line)?;
                let vsync = parse_time_list(field(row, vsync_times), "vsync_times", line)?;
                Ok(UpdateRecord {
                    ids: parse_id_list(field(row, id)),
                    mode: field(row, mode).to_string(),
                    immediate: false,
                    width: parse_dimension(field(row, width), "width", line)?,
                    height: parse_dimension(field(row, height), "height", line)?,
                    enqueue_times: vec![parse_time(field(row, queue_time), "queue_time", line)?],
                    dequeue_times: vec![parse_time(
                        field(row, dequeue_time),
                        "dequeue_time",
                        line,
                    )?],
                    generate: consecutive_spans(&generate),
                    vsync: consecutive_spans(&vsync),
                })
            }
            Schema::Batch {
                id,
                mode,
                immediate,
                width,
                height,
                enqueue_times,
                dequeue_times,
                generate_start_times,
                generate_end_times,
                vsync_start_times,
                vsync_end_times,
            } => {
                let generate_starts =
                    parse_time_list(field(row, generate_start_times), "generate_start_times", line)?;
                let generate_ends =
                    parse_time_list(field(row, generate_end_times), "generate_end_times", line)?;
                let vsync_starts =
                    parse_time_list(field(row, vsync_start_times), "vsync_start_times", line)?;
                let vsync_ends =
                    parse_time_list(field(row, vsync_end_times), "vsync_end_times", line)?;
                Ok(UpdateRecord {
                    ids: parse_id_list(field(row, id)),
                    mode: field(row, mode).to_string(),
                    immediate: parse_flag(field(row, immediate), "immediate", line)?,
                    width: parse_dimension(field(row, width), "width", line)?,
                    height: parse_dimension(field(row, height), "height", line)?,
                    enqueue_times: parse_time_list(
                        field(row, enqueue_times),
                        "enqueue_times",
                        line,
                    )?,
                    dequeue_times: parse_time_list(
                        field(row, dequeue_times),
                        "dequeue_times",
                        line,
                    )?,
                    generate: zipped_spans(&generate_starts, &generate_ends),
                    vsync: zipped_spans(&vsync_starts, &vsync_ends),
                })
            }
        }
    }
}

/// Fetch a field by resolved column index. The csv reader rejects ragged
/// rows before we get here, so a resolved index is always present.
fn field(row: &StringRecord, index: usize) -> &str {
    row.get(index).unwrap_or("")
}

fn malformed(value: &str, name: &str, line: u64) -> anyhow::Error {
    MalformedFieldError {
        line,
        field: name.to_string(),
        value: value.to_string(),
    }
    .into()
}

fn parse_time(value: &str, name: &str, line: u64) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|_| malformed(value, name, line))
}

fn parse_dimension(value: &str, name: &str, line: u64) -> Result<u32> {
    value
        .parse::<u32>()
        .map_err(|_| malformed(value, name, line))
}

fn parse_flag(value: &str, name: &str, line: u64) -> Result<bool> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(malformed(value, name, line)),
    }
}

/// Parse a `:`-joined timestamp list. Empty segments are dropped, so the
/// empty string is an empty sequence rather than a one-element parse
/// failure.
fn parse_time_list(value: &str, name: &str, line: u64) -> Result<Vec<i64>> {
    value
        .split(LIST_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(|part| parse_time(part, name, line))
        .collect()
}

/// Parse a `:`-joined id list. Ids are opaque tokens, not necessarily
/// numeric.
fn parse_id_list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Consecutive pairs of a timestamp sequence: N timestamps yield N-1 spans,
/// so a singleton (or empty) sequence yields none.
fn consecutive_spans(times: &[i64]) -> Vec<TimeSpan> {
    times
        .windows(2)
        .map(|pair| TimeSpan::new(pair[0], pair[1]))
        .collect()
}

/// Zip separate start/end sequences into spans.
fn zipped_spans(starts: &[i64], ends: &[i64]) -> Vec<TimeSpan> {
    starts
        .iter()
        .zip(ends.iter())
        .map(|(&start, &end)| TimeSpan::new(start, end))
        .collect()
}
