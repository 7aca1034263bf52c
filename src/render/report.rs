//! Interactive HTML report of an update timeline.
//!
//! Same row layout as the static plot, but every positioned element also
//! carries its raw timestamps as `data-start`/`data-end` attributes. The
//! embedded script watches a zoom slider and recomputes all `left`/`width`
//! styles from those attributes alone, so changing the zoom never needs a
//! second render.

use std::fmt::Write as _;

use anyhow::Result;

use crate::render::{
    escape_markup, generate_label, parity, queue_label, vsync_label, TimeScale, INITIAL_ZOOM,
};
use crate::trace::UpdateRecord;

/// Lower bound of the zoom slider, in pixels per trace time unit.
pub const ZOOM_MIN: f64 = 0.000_01;

/// Upper bound of the zoom slider.
pub const ZOOM_MAX: f64 = 0.001;

/// Step of the zoom slider.
pub const ZOOM_STEP: f64 = 0.000_005;

/// Style and behavior blobs embedded into the report page.
///
/// The renderer does not read any files itself; callers decide where the
/// assets come from (the CLI embeds the defaults at compile time).
#[derive(Debug, Clone, Copy)]
pub struct ReportAssets<'a> {
    pub stylesheet: &'a str,
    pub script: &'a str,
}

/// Render the trace as a self-contained interactive HTML document.
pub fn render_report(updates: &[UpdateRecord], assets: &ReportAssets<'_>) -> Result<String> {
    let scale = TimeScale::from_records(updates, 0, INITIAL_ZOOM)?;

    let mut html = String::new();
    writeln!(html, "<!doctype html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<title>Update Performance Report</title>")?;
    writeln!(html, "<style>")?;
    html.push_str(assets.stylesheet);
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<p class=\"controls\">")?;
    writeln!(
        html,
        r#"Zoom: <input id="zoom" type="range" value="{INITIAL_ZOOM}" min="{ZOOM_MIN}" max="{ZOOM_MAX}" step="{ZOOM_STEP}">"#
    )?;
    writeln!(html, "</p>")?;
    writeln!(html, "<div class=\"timeline-container\">")?;
    writeln!(
        html,
        r#"<div class="timeline" data-start="{}" data-end="{}" style="width: {}px">"#,
        scale.start_time,
        scale.end_time,
        scale.total_width(),
    )?;

    for (row, update) in updates.iter().enumerate() {
        draw_row(&mut html, &scale, row, update)?;
    }

    for tick in scale.ticks() {
        writeln!(
            html,
            r#"<div class="timeline-tick" data-start="{tick}" style="left: {}px;"></div>"#,
            scale.x(tick),
        )?;
    }

    writeln!(html, "</div>")?;
    writeln!(html, "</div>")?;
    writeln!(html, "<script>")?;
    html.push_str(assets.script);
    writeln!(html, "</script>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
}

fn draw_row(
    html: &mut String,
    scale: &TimeScale,
    row: usize,
    update: &UpdateRecord,
) -> Result<()> {
    let immediate = if update.immediate { " immediate" } else { "" };
    writeln!(
        html,
        r#"<div class="timeline-row timeline-row-{}{immediate}">"#,
        parity(row),
    )?;

    if update.ids.len() > 1 {
        let pairs = update
            .ids
            .iter()
            .zip(update.enqueue_times.iter().zip(&update.dequeue_times));
        for (id, (&enqueue, &dequeue)) in pairs {
            writeln!(
                html,
                r#"<div class="update-queue-item" title="{}" data-start="{enqueue}" data-end="{dequeue}" style="left: {}px; width: {}px;"></div>"#,
                escape_markup(&queue_label(id, enqueue, dequeue)),
                scale.x(enqueue),
                scale.span_width(enqueue, dequeue),
            )?;
        }
    } else if let (Some(id), Some(&enqueue), Some(&dequeue)) = (
        update.ids.first(),
        update.enqueue_times.first(),
        update.dequeue_times.first(),
    ) {
        // Point marker: no data-end, so the script only moves it.
        writeln!(
            html,
            r#"<div class="update-queue-mark" title="{}" data-start="{enqueue}" style="left: {}px;"></div>"#,
            escape_markup(&queue_label(id, enqueue, dequeue)),
            scale.x(enqueue),
        )?;
    }

    for (frame, span) in update.generate.iter().enumerate() {
        writeln!(
            html,
            r#"<div class="update-generate-item frame-{}" title="{}" data-start="{}" data-end="{}" style="left: {}px; width: {}px;"></div>"#,
            parity(frame),
            generate_label(frame, span.start, span.end),
            span.start,
            span.end,
            scale.x(span.start),
            scale.span_width(span.start, span.end),
        )?;
    }

    for (frame, span) in update.vsync.iter().enumerate() {
        writeln!(
            html,
            r#"<div class="update-vsync-item frame-{}" title="{}" data-start="{}" data-end="{}" style="left: {}px; width: {}px;"></div>"#,
            parity(frame),
            vsync_label(frame, span.start, span.end),
            span.start,
            span.end,
            scale.x(span.start),
            scale.span_width(span.start, span.end),
        )?;
    }

    writeln!(html, "</div>")?;
    Ok(())
}
