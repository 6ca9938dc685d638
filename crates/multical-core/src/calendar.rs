//! A single named, timezone-tagged calendar.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::config::DisplaySettings;
use crate::error::{CalendarError, CalendarResult};
use crate::event::{Event, all_day_span};
use crate::recurrence::{self, RepeatBound, WeekdaySet};
use crate::store::{EventId, EventStore};

/// A named calendar owning its events.
///
/// Besides the [`EventStore`], a calendar remembers which series keys of
/// other calendars were copied into it and under which local key, so that
/// repeated copies of one source series land in one target series.
#[derive(Debug, Clone)]
pub struct SpecificCalendar {
    name: String,
    timezone: Tz,
    pub(crate) store: EventStore,
    copied_series: HashMap<NaiveDateTime, NaiveDateTime>,
    pub(crate) display: DisplaySettings,
}

impl SpecificCalendar {
    /// Creates an empty calendar.
    pub fn new(name: impl Into<String>, timezone: Tz) -> Self {
        Self {
            name: name.into(),
            timezone,
            store: EventStore::new(),
            copied_series: HashMap::new(),
            display: DisplaySettings::default(),
        }
    }

    /// Builder method to set display settings.
    pub fn with_display(mut self, display: DisplaySettings) -> Self {
        self.display = display;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_timezone(&mut self, timezone: Tz) {
        self.timezone = timezone;
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Gets an event by id.
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.store.get(id)
    }

    /// Iterates all events in creation order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.store.iter().map(|(_, e)| e)
    }

    /// Creates an event. A missing `end` makes it an all-day event on
    /// `start`'s date.
    pub fn create_event(
        &mut self,
        subject: impl Into<String>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> CalendarResult<EventId> {
        self.add_event(Event::with_optional_end(subject, start, end))
    }

    /// Adds a fully specified event.
    pub fn add_event(&mut self, event: Event) -> CalendarResult<EventId> {
        self.store.insert(event)
    }

    /// Creates a weekly series repeating `times` times per weekday.
    pub fn create_series_times(
        &mut self,
        subject: impl Into<String>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        weekdays: &WeekdaySet,
        times: u32,
    ) -> CalendarResult<Vec<EventId>> {
        self.create_series(subject.into(), start, end, weekdays, RepeatBound::Times(times))
    }

    /// Creates a weekly series repeating while occurrences start on or before `until`.
    pub fn create_series_until(
        &mut self,
        subject: impl Into<String>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        weekdays: &WeekdaySet,
        until: NaiveDate,
    ) -> CalendarResult<Vec<EventId>> {
        self.create_series(subject.into(), start, end, weekdays, RepeatBound::Until(until))
    }

    // Occurrences created before a duplicate is hit stay in the calendar
    // and in the series.
    fn create_series(
        &mut self,
        subject: String,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        weekdays: &WeekdaySet,
        bound: RepeatBound,
    ) -> CalendarResult<Vec<EventId>> {
        let key = match end {
            Some(_) => start,
            None => all_day_span(start.date()).0,
        };
        let occurrences = recurrence::expand(start, end, weekdays, bound)?;
        let mut ids = Vec::with_capacity(occurrences.len());
        for (occ_start, occ_end) in occurrences {
            let id = self
                .store
                .insert(Event::new(subject.clone(), occ_start, occ_end))
                .inspect_err(|e| {
                    debug!(calendar = %self.name, start = %occ_start, error = %e, "Series creation aborted");
                })?;
            self.store.add_to_series(key, id);
            ids.push(id);
        }
        info!(
            calendar = %self.name,
            subject = %subject,
            key = %key,
            weekdays = %weekdays,
            count = ids.len(),
            "Created series"
        );
        Ok(ids)
    }

    /// Returns the key of the series holding the event with this subject and start.
    pub fn series_key_of(&self, subject: &str, start: NaiveDateTime) -> Option<NaiveDateTime> {
        self.store
            .find(subject, start)
            .into_iter()
            .find_map(|id| self.store.series_key_of(id))
    }

    /// Events of the series stored under `key`, in series order.
    pub fn series(&self, key: NaiveDateTime) -> Vec<&Event> {
        self.store
            .series(key)
            .iter()
            .filter_map(|id| self.store.get(*id))
            .collect()
    }

    /// All series keys in ascending order.
    pub fn series_keys(&self) -> Vec<NaiveDateTime> {
        self.store.series_keys().collect()
    }

    /// Returns the local series key that a copied source series maps to,
    /// recording `fallback` as the mapping when the source key is new.
    pub(crate) fn copied_series_key(
        &mut self,
        source_key: NaiveDateTime,
        fallback: NaiveDateTime,
    ) -> NaiveDateTime {
        *self.copied_series.entry(source_key).or_insert(fallback)
    }

    /// Looks up where a source series key was copied to, if anywhere.
    pub fn copied_series(&self, source_key: NaiveDateTime) -> Option<NaiveDateTime> {
        self.copied_series.get(&source_key).copied()
    }
}

/// Parses an IANA timezone identifier.
pub fn parse_timezone(value: &str) -> CalendarResult<Tz> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|_| CalendarError::validation(format!("unknown timezone '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use chrono::Weekday;

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
        SpecificCalendar::new("work", chrono_tz::America::New_York)
    }

    mod events {
        use super::*;

        #[test]
        fn create_all_day_when_end_missing() {
            let mut cal = calendar();
            let id = cal.create_event("Offsite", dt(2025, 6, 16, 15, 0), None).unwrap();
            let event = cal.get(id).unwrap();
            assert!(event.is_all_day());
            assert_eq!(event.start, dt(2025, 6, 16, 8, 0));
        }

        #[test]
        fn duplicate_detection_spans_whole_calendar() {
            let mut cal = calendar();
            cal.create_event("Trip", dt(2025, 6, 16, 20, 0), Some(dt(2025, 6, 18, 6, 0)))
                .unwrap();
            let err = cal
                .create_event("Trip", dt(2025, 6, 16, 20, 0), Some(dt(2025, 6, 18, 6, 0)))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Duplicate);
        }

        #[test]
        fn add_event_keeps_details() {
            let mut cal = calendar();
            let event = Event::new("Review", dt(2025, 6, 16, 10, 0), dt(2025, 6, 16, 11, 0))
                .with_description("Q2")
                .with_status(crate::Status::Private);
            let id = cal.add_event(event.clone()).unwrap();
            assert_eq!(cal.get(id), Some(&event));
        }

        #[test]
        fn parse_timezone_rejects_unknown() {
            assert_eq!(parse_timezone("Europe/Paris").unwrap(), chrono_tz::Europe::Paris);
            assert_eq!(
                parse_timezone("Mars/Olympus").unwrap_err().kind(),
                ErrorKind::Validation
            );
        }
    }

    mod series {
        use super::*;

        #[test]
        fn times_records_series_in_generation_order() {
            let mut cal = calendar();
            let days = WeekdaySet::parse("MWF").unwrap();
            let key = dt(2025, 6, 16, 9, 0);
            let ids = cal
                .create_series_times("Standup", key, Some(dt(2025, 6, 16, 9, 30)), &days, 2)
                .unwrap();
            assert_eq!(ids.len(), 6);
            assert_eq!(cal.store().series(key), ids.as_slice());
            let weekdays: Vec<Weekday> = cal
                .series(key)
                .iter()
                .map(|e| chrono::Datelike::weekday(&e.start))
                .collect();
            assert_eq!(
                weekdays,
                vec![
                    Weekday::Mon,
                    Weekday::Mon,
                    Weekday::Wed,
                    Weekday::Wed,
                    Weekday::Fri,
                    Weekday::Fri
                ]
            );
            assert_eq!(cal.series_key_of("Standup", dt(2025, 6, 25, 9, 0)), Some(key));
        }

        #[test]
        fn until_creates_inclusive_range() {
            let mut cal = calendar();
            let days = WeekdaySet::parse("T").unwrap();
            let ids = cal
                .create_series_until(
                    "Gym",
                    dt(2025, 6, 16, 18, 0),
                    Some(dt(2025, 6, 16, 19, 0)),
                    &days,
                    date(2025, 7, 1),
                )
                .unwrap();
            assert_eq!(ids.len(), 3);
            assert_eq!(cal.get(ids[2]).unwrap().start, dt(2025, 7, 1, 18, 0));
        }

        #[test]
        fn duplicate_aborts_without_rollback() {
            let mut cal = calendar();
            cal.create_event("Standup", dt(2025, 6, 18, 9, 0), Some(dt(2025, 6, 18, 9, 30)))
                .unwrap();
            let days = WeekdaySet::parse("MW").unwrap();
            let key = dt(2025, 6, 16, 9, 0);
            let err = cal
                .create_series_times("Standup", key, Some(dt(2025, 6, 16, 9, 30)), &days, 2)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Duplicate);
            // Both Monday occurrences were committed before Wednesday failed.
            assert_eq!(cal.store().len(), 3);
            assert_eq!(cal.series(key).len(), 2);
        }

        #[test]
        fn multi_day_template_rejected() {
            let mut cal = calendar();
            let days = WeekdaySet::parse("M").unwrap();
            let err = cal
                .create_series_times(
                    "Night shift",
                    dt(2025, 6, 16, 22, 0),
                    Some(dt(2025, 6, 17, 6, 0)),
                    &days,
                    2,
                )
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(cal.store().is_empty());
        }

        #[test]
        fn all_day_series_keyed_at_normalized_start() {
            let mut cal = calendar();
            let days = WeekdaySet::parse("F").unwrap();
            cal.create_series_times("Demo day", dt(2025, 6, 16, 12, 0), None, &days, 1)
                .unwrap();
            assert_eq!(cal.series_keys(), vec![dt(2025, 6, 16, 8, 0)]);
            assert!(cal.series(dt(2025, 6, 16, 8, 0))[0].is_all_day());
        }
    }
}
