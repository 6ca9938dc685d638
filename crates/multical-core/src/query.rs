//! Date listing, range listing and busy/available status.

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::calendar::SpecificCalendar;
use crate::event::Event;
use crate::format::format_events;

/// Whether a calendar has an event in progress at some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Busy,
    Available,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "busy"),
            Self::Available => write!(f, "available"),
        }
    }
}

impl SpecificCalendar {
    /// Events listed under `date` (including multi-day events passing
    /// through it), ordered by start.
    pub fn events_on(&self, date: NaiveDate) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.store.events_on(date).map(|(_, e)| e).collect();
        events.sort_by_key(|e| e.start);
        events
    }

    /// Events starting in `[start, end)`, each listed once, ordered by start.
    ///
    /// Empty when `end` is before `start`.
    pub fn events_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&Event> {
        if end < start {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        let mut events = Vec::new();
        for day in start.date().iter_days().take_while(|d| *d <= end.date()) {
            for (id, event) in self.store.events_on(day) {
                if event.start >= start && event.start < end && seen.insert(id) {
                    events.push(event);
                }
            }
        }
        events.sort_by_key(|e| e.start);
        events
    }

    /// Renders the events on `date`, or the "no events" text when there are none.
    pub fn print_events(&self, date: NaiveDate) -> String {
        let events = self.events_on(date);
        if events.is_empty() {
            return self.display.no_events_text.clone();
        }
        format_events(events)
    }

    /// Renders the events starting in `[start, end)`; empty when none match.
    pub fn print_events_interval(&self, start: NaiveDateTime, end: NaiveDateTime) -> String {
        format_events(self.events_between(start, end))
    }

    /// Busy if some event covers `instant`; an event's end is exclusive.
    pub fn show_status(&self, instant: NaiveDateTime) -> Availability {
        let busy = self
            .store
            .events_on(instant.date())
            .any(|(_, e)| e.occurs_at(instant));
        if busy {
            Availability::Busy
        } else {
            Availability::Available
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> SpecificCalendar {
        let mut cal = SpecificCalendar::new("work", chrono_tz::UTC);
        cal.create_event("Lunch", dt(2025, 6, 16, 12, 0), Some(dt(2025, 6, 16, 13, 0)))
            .unwrap();
        cal.create_event("Standup", dt(2025, 6, 16, 9, 0), Some(dt(2025, 6, 16, 9, 15)))
            .unwrap();
        cal.create_event("Trip", dt(2025, 6, 16, 20, 0), Some(dt(2025, 6, 18, 6, 0)))
            .unwrap();
        cal
    }

    mod print {
        use super::*;

        #[test]
        fn day_is_start_ordered() {
            let cal = calendar();
            insta::assert_snapshot!(cal.print_events(date(2025, 6, 16)), @r"
            - Standup: 2025-06-16 09:00 to 09:15
            - Lunch: 2025-06-16 12:00 to 13:00
            - Trip: 2025-06-16 20:00 to 2025-06-18 06:00
            ");
        }

        #[test]
        fn multi_day_listed_on_later_days() {
            let cal = calendar();
            insta::assert_snapshot!(
                cal.print_events(date(2025, 6, 17)),
                @"- Trip: 2025-06-16 20:00 to 2025-06-18 06:00"
            );
        }

        #[test]
        fn empty_day_sentinel() {
            let cal = calendar();
            assert_eq!(cal.print_events(date(2025, 6, 20)), "No events on this date");
        }

        #[test]
        fn created_subject_appears_once() {
            let mut cal = SpecificCalendar::new("home", chrono_tz::UTC);
            cal.create_event("Dentist", dt(2025, 6, 19, 15, 0), Some(dt(2025, 6, 19, 16, 0)))
                .unwrap();
            let out = cal.print_events(date(2025, 6, 19));
            assert_eq!(out.matches("Dentist").count(), 1);
        }
    }

    mod interval {
        use super::*;

        #[test]
        fn half_open_on_start() {
            let cal = calendar();
            insta::assert_snapshot!(
                cal.print_events_interval(dt(2025, 6, 16, 9, 0), dt(2025, 6, 16, 20, 0)),
                @r"
            - Standup: 2025-06-16 09:00 to 09:15
            - Lunch: 2025-06-16 12:00 to 13:00
            "
            );
        }

        #[test]
        fn events_before_range_start_excluded() {
            let cal = calendar();
            let out = cal.print_events_interval(dt(2025, 6, 16, 10, 0), dt(2025, 6, 18, 0, 0));
            assert!(!out.contains("Standup"));
            assert!(out.contains("Lunch"));
            assert_eq!(out.matches("Trip").count(), 1);
        }

        #[test]
        fn empty_and_reversed() {
            let cal = calendar();
            assert_eq!(
                cal.print_events_interval(dt(2025, 7, 1, 0, 0), dt(2025, 7, 2, 0, 0)),
                ""
            );
            assert_eq!(
                cal.print_events_interval(dt(2025, 6, 17, 0, 0), dt(2025, 6, 16, 0, 0)),
                ""
            );
        }
    }

    mod status {
        use super::*;

        #[test]
        fn end_is_exclusive() {
            let mut cal = SpecificCalendar::new("work", chrono_tz::UTC);
            cal.create_event("Call", dt(2025, 6, 16, 10, 0), Some(dt(2025, 6, 16, 11, 0)))
                .unwrap();
            assert_eq!(cal.show_status(dt(2025, 6, 16, 10, 0)).to_string(), "busy");
            assert_eq!(cal.show_status(dt(2025, 6, 16, 10, 30)), Availability::Busy);
            assert_eq!(cal.show_status(dt(2025, 6, 16, 11, 0)).to_string(), "available");
            assert_eq!(cal.show_status(dt(2025, 6, 16, 9, 59)), Availability::Available);
        }

        #[test]
        fn multi_day_busy_on_middle_day() {
            let cal = calendar();
            assert_eq!(cal.show_status(dt(2025, 6, 17, 12, 0)), Availability::Busy);
            assert_eq!(cal.show_status(dt(2025, 6, 18, 6, 0)), Availability::Available);
        }
    }
}
