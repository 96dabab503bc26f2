//! HTML schedule grid.
//!
//! One block per day, one column per room, events drawn as absolutely
//! positioned boxes whose height follows their duration. The output is a
//! fragment meant to be wrapped in a page and styled by the caller.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{AggError, AggResult};
use crate::event::Event;
use crate::feed::Feed;

/// Width of each room column
pub const COLUMN_WIDTH: i64 = 150;

/// Height of the room header band at the top of each day
pub const HEADER_HEIGHT: i64 = 30;

/// Vertical pixels per minute
pub const PIXELS_PER_MINUTE: f64 = 1.7;

/// Render the grid for `events`, which must already be sorted by start.
///
/// Days are bucketed by the UTC date of each event's start, while the times
/// shown inside the blocks are in `display_tz`. Overlapping events in the
/// same room are drawn on top of each other.
pub fn generate_html(feeds: &[Feed], events: &[Event], display_tz: Tz) -> AggResult<String> {
    let rooms = room_columns(feeds);
    let mut headers: Vec<(&str, usize)> = rooms.iter().map(|(name, col)| (*name, *col)).collect();
    headers.sort_by_key(|(_, col)| *col);

    let days: BTreeSet<NaiveDate> = events.iter().map(|e| e.start.date_naive()).collect();

    let mut out = String::new();

    for day in days {
        // Bounds of this day's grid. Full scans, the lists are small.
        let (Some(first), Some(last)) = (
            events_on(events, day).map(|e| e.start).min(),
            events_on(events, day).map(|e| e.end).max(),
        ) else {
            continue;
        };
        debug!(%day, %first, %last, "laying out day");

        out.push_str(&format!("<h2>{day}</h2>\n"));
        out.push_str(&format!(
            "<div class=\"schedwrap\" style=\"width: {}px; height: {}px; \">\n",
            rooms.len() as i64 * COLUMN_WIDTH,
            px(y_pixels(last, first) + HEADER_HEIGHT as f64),
        ));

        for (name, col) in &headers {
            out.push_str(&format!(
                " <div class=\"sessblock roomheader\" style=\"left: {}px; width: {}px; height:28px;\">{}</div>\n",
                *col as i64 * COLUMN_WIDTH,
                COLUMN_WIDTH - 2,
                name,
            ));
        }

        for event in events_on(events, day) {
            let room = event.location.as_deref().unwrap_or_default();
            let col = *rooms
                .get(room)
                .ok_or_else(|| AggError::UnknownRoom(room.to_string()))?;

            out.push_str(&format!(
                " <div class=\"sessblock\" style=\"top: {}px; left: {}px; width: {}px; height: {}px;\">{} - {}<br/>{}</div>\n",
                px(y_pixels(event.start, first) + HEADER_HEIGHT as f64),
                col as i64 * COLUMN_WIDTH,
                COLUMN_WIDTH - 2,
                px(y_pixels(event.end, event.start) - 2.0),
                event.start.with_timezone(&display_tz).format("%H:%M"),
                event.end.with_timezone(&display_tz).format("%H:%M"),
                event.summary,
            ));
        }

        out.push_str("</div>\n");
    }

    Ok(out)
}

/// Events whose start falls on `day` (UTC), in list order.
fn events_on(events: &[Event], day: NaiveDate) -> impl Iterator<Item = &Event> {
    events.iter().filter(move |e| e.start.date_naive() == day)
}

/// Column index per room name. A name registered twice keeps its last position.
fn room_columns(feeds: &[Feed]) -> HashMap<&str, usize> {
    feeds
        .iter()
        .enumerate()
        .map(|(i, feed)| (feed.name.as_str(), i))
        .collect()
}

/// Vertical distance between two instants. Whole minutes only; leftover
/// seconds are dropped before scaling.
fn y_pixels(t: DateTime<Utc>, reference: DateTime<Utc>) -> f64 {
    let minutes = (t - reference).num_seconds() / 60;
    minutes as f64 * PIXELS_PER_MINUTE
}

/// Format a pixel value: `51` rather than `51.0`, `25.5` as is, and float
/// noise such as `5.1000000000000005` trimmed.
fn px(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}
