//! Static SVG plot of an update timeline.
//!
//! Each update occupies one horizontal row, with time flowing left to
//! right. A row shows the queue phase (a diamond marker for a lone update,
//! one wait bar per merged update otherwise), a pre-process bar from the
//! dequeue slot to the first generation start, then one bar per generation
//! frame and one per vsync frame, alternating shades on frame parity.
//! Every shape embeds a `<title>` tooltip with its duration.

use std::fmt::Write as _;

use anyhow::Result;

use crate::render::{
    escape_markup, generate_label, parity, queue_label, vsync_label, TimeScale, INITIAL_ZOOM,
    UPDATE_ROW_HEIGHT,
};
use crate::trace::UpdateRecord;

/// Extra time kept visible left of the first enqueue and right of the last
/// vsync, in trace time units.
pub const TIME_MARGIN: i64 = 100_000;

/// Render the trace as a self-contained SVG document.
///
/// `stylesheet` is embedded verbatim into the document's `<style>` block;
/// the caller owns where it comes from.
pub fn render_plot(updates: &[UpdateRecord], stylesheet: &str) -> Result<String> {
    let scale = TimeScale::from_records(updates, TIME_MARGIN, INITIAL_ZOOM)?;
    let total_width = scale.total_width();
    let total_height = updates.len() as f64 * UPDATE_ROW_HEIGHT;

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg version="1.1" xmlns="http://www.w3.org/2000/svg" width="{total_width}" height="{total_height}">"#
    )?;
    writeln!(svg, "<style type=\"text/css\"><![CDATA[")?;
    svg.push_str(stylesheet);
    writeln!(svg, "]]></style>")?;

    for row in 0..updates.len() {
        writeln!(
            svg,
            r#"<rect x="0" y="{}" width="{total_width}" height="{UPDATE_ROW_HEIGHT}" class="stripe-{}" />"#,
            row as f64 * UPDATE_ROW_HEIGHT,
            parity(row),
        )?;
    }

    for tick in scale.ticks() {
        let x = scale.x(tick);
        writeln!(
            svg,
            r#"<line x1="{x}" x2="{x}" y1="0" y2="{total_height}" class="time-tick" />"#
        )?;
    }

    for (row, update) in updates.iter().enumerate() {
        draw_update(&mut svg, &scale, row, update)?;
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

fn draw_update(
    svg: &mut String,
    scale: &TimeScale,
    row: usize,
    update: &UpdateRecord,
) -> Result<()> {
    let y = row as f64 * UPDATE_ROW_HEIGHT;

    if update.ids.len() > 1 {
        let pairs = update
            .ids
            .iter()
            .zip(update.enqueue_times.iter().zip(&update.dequeue_times));
        for (id, (&enqueue, &dequeue)) in pairs {
            writeln!(
                svg,
                r#"<rect x="{}" y="{y}" width="{}" height="{UPDATE_ROW_HEIGHT}" class="update-queue-wait"><title>{}</title></rect>"#,
                scale.x(enqueue),
                scale.span_width(enqueue, dequeue),
                escape_markup(&queue_label(id, enqueue, dequeue)),
            )?;
        }
    } else if let (Some(id), Some(&enqueue), Some(&dequeue)) = (
        update.ids.first(),
        update.enqueue_times.first(),
        update.dequeue_times.first(),
    ) {
        // Lone update: a small diamond at the enqueue time.
        let x = scale.x(enqueue);
        let size = 0.3 * UPDATE_ROW_HEIGHT;
        writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{size}" height="{size}" class="update-queue" transform="rotate(45 {x} {})"><title>{}</title></rect>"#,
            x - 0.15 * UPDATE_ROW_HEIGHT,
            y + 0.35 * UPDATE_ROW_HEIGHT,
            y + 0.5 * UPDATE_ROW_HEIGHT,
            escape_markup(&queue_label(id, enqueue, dequeue)),
        )?;
    }

    // Pre-process phase: the dequeue slot closes when the last merged
    // update leaves the queue, generation picks up from there.
    if let (Some(&dequeue), Some(first)) = (update.dequeue_times.last(), update.generate.first()) {
        writeln!(
            svg,
            r#"<rect x="{}" y="{y}" width="{}" height="{UPDATE_ROW_HEIGHT}" class="update-prepare"><title>Pre-processing: {}</title></rect>"#,
            scale.x(dequeue),
            scale.span_width(dequeue, first.start),
            crate::render::millis(dequeue, first.start),
        )?;
    }

    for (frame, span) in update.generate.iter().enumerate() {
        writeln!(
            svg,
            r#"<rect x="{}" y="{y}" width="{}" height="{UPDATE_ROW_HEIGHT}" class="update-generate-{}"><title>{}</title></rect>"#,
            scale.x(span.start),
            scale.span_width(span.start, span.end),
            parity(frame),
            generate_label(frame, span.start, span.end),
        )?;
    }

    for (frame, span) in update.vsync.iter().enumerate() {
        writeln!(
            svg,
            r#"<rect x="{}" y="{y}" width="{}" height="{UPDATE_ROW_HEIGHT}" class="update-vsync-{}"><title>{}</title></rect>"#,
            scale.x(span.start),
            scale.span_width(span.start, span.end),
            parity(frame),
            vsync_label(frame, span.start, span.end),
        )?;
    }

    Ok(())
}
