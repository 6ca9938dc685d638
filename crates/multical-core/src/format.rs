//! Plain-text rendering of events.
//!
//! One event per line:
//! - timed: `- Standup: 2025-06-16 09:00 to 09:30`
//! - multi-day: `- Trip: 2025-06-16 20:00 to 2025-06-18 06:00`
//! - all-day: `- Holiday: 2025-06-16 (all day)`
//!
//! Non-default location or status and a non-empty description are appended.

use crate::event::{Event, Location, Status};

const DATE: &str = "%Y-%m-%d";
const DATE_TIME: &str = "%Y-%m-%d %H:%M";
const TIME: &str = "%H:%M";

/// Renders one event as a single line.
pub fn format_event(event: &Event) -> String {
    let when = if event.is_all_day() {
        format!("{} (all day)", event.start.format(DATE))
    } else if event.is_multi_day() {
        format!(
            "{} to {}",
            event.start.format(DATE_TIME),
            event.end.format(DATE_TIME)
        )
    } else {
        format!("{} to {}", event.start.format(DATE_TIME), event.end.format(TIME))
    };

    let mut line = format!("- {}: {}", event.subject, when);
    if event.location != Location::default() {
        line.push_str(&format!(" [{}]", event.location));
    }
    if event.status != Status::default() {
        line.push_str(&format!(" [{}]", event.status));
    }
    if !event.description.is_empty() {
        line.push_str(" - ");
        line.push_str(&event.description);
    }
    line
}

/// Renders events one per line, in the order given.
pub fn format_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> String {
    events
        .into_iter()
        .map(format_event)
        .collect::<Vec<_>>()
        .join("\n")
}
