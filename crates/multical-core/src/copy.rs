//! Copying events between calendars.
//!
//! [`Session::copy_event`] shifts an event literally: the copy starts at the
//! requested start and its end moves by the same number of days and
//! minutes. The day and interval variants first reinterpret each start
//! instant in the target calendar's timezone and then delegate.
//!
//! A copied occurrence of a series joins a series in the target calendar.
//! The target remembers which source key maps to which local key, so
//! copying further occurrences of the same source series later extends the
//! same target series instead of starting a new one.

use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::error::{CalendarError, CalendarResult};
use crate::event::Event;
use crate::registry::Session;
use crate::store::EventId;

impl Session {
    /// Copies the single event in the current calendar with this subject and
    /// start into `target`, starting at `target_start`.
    ///
    /// Returns the id of the copy in the target calendar.
    pub fn copy_event(
        &mut self,
        subject: &str,
        source_start: NaiveDateTime,
        target: &str,
        target_start: NaiveDateTime,
    ) -> CalendarResult<EventId> {
        let source_handle = self.current_handle()?;
        let source = self
            .registry
            .get(source_handle)
            .ok_or_else(CalendarError::no_active_calendar)?;

        let id = match source.store().find(subject, source_start).as_slice() {
            [] => {
                return Err(CalendarError::not_found(format!(
                    "event '{subject}' starting {source_start}"
                )));
            }
            [id] => *id,
            _ => {
                return Err(CalendarError::validation(format!(
                    "several events named '{subject}' start at {source_start}"
                )));
            }
        };
        let original = source
            .get(id)
            .ok_or_else(|| CalendarError::not_found(format!("event '{subject}'")))?;
        let source_series = source.store().series_key_of(id);

        let days = (target_start.date() - source_start.date()).num_days();
        let minutes = (target_start.time() - source_start.time()).num_minutes();
        let copy = Event {
            start: target_start,
            end: original.end + Duration::days(days) + Duration::minutes(minutes),
            ..original.clone()
        };

        let target_calendar = self.registry.by_name_mut(target)?;
        let new_id = target_calendar.store.insert(copy)?;
        if let Some(source_key) = source_series {
            let key = target_calendar.copied_series_key(source_key, target_start);
            target_calendar.store.add_to_series(key, new_id);
            debug!(source_key = %source_key, target_key = %key, "Copied into series");
        }
        info!(subject, from = %source_start, to = %target_start, target, "Copied event");
        Ok(new_id)
    }

    /// Copies every event starting on `date` in the current calendar onto
    /// `target_date` in `target`, converting start times between the two
    /// calendars' timezones.
    ///
    /// Returns how many events were copied. Copies made before a failure
    /// are kept.
    pub fn copy_events(
        &mut self,
        date: NaiveDate,
        target: &str,
        target_date: NaiveDate,
    ) -> CalendarResult<usize> {
        let source = self.current_calendar()?;
        let from_tz = source.timezone();
        let to_tz = self.registry.by_name(target)?.timezone();

        let plan = source
            .events_on(date)
            .into_iter()
            .filter(|e| e.start.date() == date)
            .map(|e| {
                let converted = convert_timezone(e.start, from_tz, to_tz)?;
                let shift = target_date - converted.date();
                Ok((e.subject.clone(), e.start, converted + shift))
            })
            .collect::<CalendarResult<Vec<_>>>()?;

        for (subject, start, target_start) in &plan {
            self.copy_event(subject, *start, target, *target_start)?;
        }
        Ok(plan.len())
    }

    /// Runs [`copy_events`](Self::copy_events) for each date in
    /// `[start, end]`, pairing the n-th source date with the n-th day after
    /// `target_date`.
    pub fn copy_events_interval(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        target: &str,
        target_date: NaiveDate,
    ) -> CalendarResult<usize> {
        let mut copied = 0;
        let days = start.iter_days().take_while(|d| *d <= end);
        for (day, target_day) in days.zip(target_date.iter_days()) {
            copied += self.copy_events(day, target, target_day)?;
        }
        Ok(copied)
    }
}

/// Reinterprets a local time in `from` as the same instant in `to`.
///
/// Ambiguous local times resolve to the earlier instant; local times that
/// do not exist in `from` are rejected.
pub fn convert_timezone(local: NaiveDateTime, from: Tz, to: Tz) -> CalendarResult<NaiveDateTime> {
    from.from_local_datetime(&local)
        .earliest()
        .map(|instant| instant.with_timezone(&to).naive_local())
        .ok_or_else(|| {
            CalendarError::validation(format!("{local} does not exist in timezone {from}"))
        })
}
