//! Single, forward-cascade and whole-series edits.
//!
//! All three tiers select events by their *current* subject, so renaming
//! events changes what later edits match. Each change is checked against
//! the rest of the calendar before it is committed; a multi-event edit
//! stops at the first failure and keeps the changes applied before it.
//!
//! Moving events in time also moves them in the series index:
//! - a single-event start edit keeps series membership;
//! - a cascade start edit moves every relocated series member into a new
//!   series keyed at the requested start;
//! - a whole-series start edit re-keys the series at the requested start.

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::calendar::SpecificCalendar;
use crate::error::{CalendarError, CalendarResult};
use crate::event::PropertyChange;
use crate::store::EventId;

impl SpecificCalendar {
    /// Edits the event(s) whose subject, start and end match exactly.
    ///
    /// Returns how many events were changed. No match is not an error and
    /// returns `Ok(0)`.
    pub fn edit_event(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        change: PropertyChange,
    ) -> CalendarResult<usize> {
        let targets: Vec<EventId> = self
            .store
            .iter()
            .filter(|(_, e)| e.subject == subject && e.start == start && e.end == end)
            .map(|(id, _)| id)
            .collect();
        if targets.is_empty() {
            warn!(calendar = %self.name(), subject, %start, %end, "No event matched edit");
            return Ok(0);
        }
        for id in &targets {
            self.apply(*id, &change)?;
        }
        debug!(calendar = %self.name(), subject, property = %change.property(), "Edited event");
        Ok(targets.len())
    }

    /// Edits every event with this subject starting at or after `from`.
    ///
    /// A start change moves the earliest match to `new_start` and shifts
    /// the others by the same amount; the series members among them leave
    /// their series for a new one keyed at `new_start`. Every other change,
    /// end included, is set on each match as given.
    pub fn edit_events(
        &mut self,
        subject: &str,
        from: NaiveDateTime,
        change: PropertyChange,
    ) -> CalendarResult<usize> {
        let targets: Vec<EventId> = self
            .store
            .iter()
            .filter(|(_, e)| e.subject == subject && e.start >= from)
            .map(|(id, _)| id)
            .collect();
        if targets.is_empty() {
            warn!(calendar = %self.name(), subject, %from, "No events matched cascade edit");
            return Ok(0);
        }
        let count = match change {
            PropertyChange::Start(new_start) => {
                let first = targets
                    .iter()
                    .filter_map(|id| self.store.get(*id))
                    .map(|e| e.start)
                    .min()
                    .unwrap_or(from);
                self.shift_and_rekey(&targets, new_start - first, new_start)?
            }
            ref other => {
                for id in &targets {
                    self.apply(*id, other)?;
                }
                targets.len()
            }
        };
        info!(
            calendar = %self.name(),
            subject,
            %from,
            property = %change.property(),
            count,
            "Edited events"
        );
        Ok(count)
    }

    /// Edits every event of the series stored under `key` that carries this
    /// subject, regardless of start time.
    ///
    /// A start change shifts all of them by `new_start - key` and re-keys
    /// them at `new_start`. An end change moves each end time-of-day,
    /// keeping its date. An unknown key matches nothing and returns `Ok(0)`.
    pub fn edit_series(
        &mut self,
        subject: &str,
        key: NaiveDateTime,
        change: PropertyChange,
    ) -> CalendarResult<usize> {
        let targets: Vec<EventId> = self
            .store
            .series(key)
            .iter()
            .copied()
            .filter(|id| self.store.get(*id).is_some_and(|e| e.subject == subject))
            .collect();
        if targets.is_empty() {
            warn!(calendar = %self.name(), subject, %key, "No series events matched edit");
            return Ok(0);
        }
        let count = match change {
            PropertyChange::Start(new_start) => {
                self.shift_and_rekey(&targets, new_start - key, new_start)?
            }
            PropertyChange::End(new_end) => self.shift_end_times(&targets, new_end)?,
            ref other => {
                for id in &targets {
                    self.apply(*id, other)?;
                }
                targets.len()
            }
        };
        info!(
            calendar = %self.name(),
            subject,
            %key,
            property = %change.property(),
            count,
            "Edited series"
        );
        Ok(count)
    }

    fn apply(&mut self, id: EventId, change: &PropertyChange) -> CalendarResult<()> {
        let Some(current) = self.store.get(id) else {
            return Ok(());
        };
        let updated = current.with_change(change);
        self.store.replace(id, updated)
    }

    // Events are moved in an order that vacates each destination slot
    // before another member of the group lands on it.
    fn shift_and_rekey(
        &mut self,
        ids: &[EventId],
        delta: Duration,
        new_key: NaiveDateTime,
    ) -> CalendarResult<usize> {
        let mut ordered: Vec<(EventId, NaiveDateTime)> = ids
            .iter()
            .filter_map(|id| self.store.get(*id).map(|e| (*id, e.start)))
            .collect();
        ordered.sort_by_key(|(_, start)| *start);
        if delta > Duration::zero() {
            ordered.reverse();
        }

        let mut relocated = Vec::with_capacity(ordered.len());
        let mut failure = None;
        for (id, start) in ordered {
            match self.apply(id, &PropertyChange::Start(start + delta)) {
                Ok(()) => relocated.push(id),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        self.store.move_to_series(&relocated, new_key);
        match failure {
            Some(e) => Err(e),
            None => Ok(relocated.len()),
        }
    }

    // The offset is measured from the first event's end time-of-day. Ends
    // keep their date, so an offset that wraps past midnight is rejected.
    fn shift_end_times(&mut self, ids: &[EventId], new_end: NaiveDateTime) -> CalendarResult<usize> {
        let Some(reference) = ids.first().and_then(|id| self.store.get(*id)) else {
            return Ok(0);
        };
        let delta = new_end.time() - reference.end.time();
        for id in ids {
            let Some(event) = self.store.get(*id) else {
                continue;
            };
            let (time, carry) = event.end.time().overflowing_add_signed(delta);
            if carry != 0 {
                return Err(CalendarError::validation(format!(
                    "moving the end of '{}' on {} to {} would cross midnight",
                    event.subject,
                    event.start.date(),
                    new_end.time()
                )));
            }
            let end = event.end.date().and_time(time);
            self.apply(*id, &PropertyChange::End(end))?;
        }
        Ok(ids.len())
    }
}
