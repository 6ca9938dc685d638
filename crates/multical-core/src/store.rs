//! Event storage with day and series indices.
//!
//! Events live in an arena and are addressed by [`EventId`]. Two indices
//! refer to the same ids:
//! - the day index maps each date to the events touching it, so a
//!   multi-day event is listed under every date it spans;
//! - the series index maps a series key (the template start) to the
//!   occurrences generated together.
//!
//! Mutating an event in the arena is therefore visible through both indices.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

use crate::error::{CalendarError, CalendarResult};
use crate::event::Event;

/// Opaque handle to an event inside one [`EventStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(usize);

/// Arena of events plus the day and series indices over it.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
    days: BTreeMap<NaiveDate, Vec<EventId>>,
    series: BTreeMap<NaiveDateTime, Vec<EventId>>,
}

impl EventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Gets an event by id.
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.get(id.0)
    }

    /// Iterates every event with its id, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EventId, &Event)> {
        self.events.iter().enumerate().map(|(i, e)| (EventId(i), e))
    }

    /// Ids of all events whose current subject and start match.
    pub fn find(&self, subject: &str, start: NaiveDateTime) -> Vec<EventId> {
        self.iter()
            .filter(|(_, e)| e.subject == subject && e.start == start)
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns the id of an event structurally equal to `event`, ignoring `except`.
    pub fn find_duplicate(&self, event: &Event, except: Option<EventId>) -> Option<EventId> {
        self.iter()
            .find(|(id, e)| Some(*id) != except && *e == event)
            .map(|(id, _)| id)
    }

    /// Inserts a new event into every date bucket it spans.
    ///
    /// Fails if the event ends before it starts or if a structurally equal
    /// event already exists anywhere in the store.
    pub fn insert(&mut self, event: Event) -> CalendarResult<EventId> {
        event.validate()?;
        if self.find_duplicate(&event, None).is_some() {
            return Err(CalendarError::event_exists());
        }
        let id = EventId(self.events.len());
        self.index_days(id, &event);
        debug!(
            subject = %event.subject,
            start = %event.start,
            end = %event.end,
            "Inserted event"
        );
        self.events.push(event);
        Ok(id)
    }

    /// Replaces the event behind `id`, moving it between date buckets when
    /// its span changes. Series membership is untouched.
    pub fn replace(&mut self, id: EventId, updated: Event) -> CalendarResult<()> {
        let current = self
            .events
            .get(id.0)
            .ok_or_else(|| CalendarError::not_found("event handle"))?;
        updated.validate()?;
        if self.find_duplicate(&updated, Some(id)).is_some() {
            return Err(CalendarError::event_exists());
        }
        let relocate =
            current.start.date() != updated.start.date() || current.end.date() != updated.end.date();
        if relocate {
            let old = current.clone();
            self.unindex_days(id, &old);
            self.index_days(id, &updated);
            trace!(subject = %updated.subject, from = %old.start, to = %updated.start, "Relocated event");
        }
        self.events[id.0] = updated;
        Ok(())
    }

    fn index_days(&mut self, id: EventId, event: &Event) {
        for day in event.spans() {
            self.days.entry(day).or_default().push(id);
        }
    }

    fn unindex_days(&mut self, id: EventId, event: &Event) {
        for day in event.spans() {
            if let Some(bucket) = self.days.get_mut(&day) {
                bucket.retain(|other| *other != id);
                if bucket.is_empty() {
                    self.days.remove(&day);
                }
            }
        }
    }

    /// Ids listed under a date, in insertion order.
    pub fn day(&self, date: NaiveDate) -> &[EventId] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Events listed under a date, in insertion order.
    pub fn events_on(&self, date: NaiveDate) -> impl Iterator<Item = (EventId, &Event)> {
        self.day(date).iter().map(|id| (*id, &self.events[id.0]))
    }

    /// Appends an event to the series stored under `key`.
    pub fn add_to_series(&mut self, key: NaiveDateTime, id: EventId) {
        self.series.entry(key).or_default().push(id);
    }

    /// Ids of a series, in generation order.
    pub fn series(&self, key: NaiveDateTime) -> &[EventId] {
        self.series.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All series keys, in ascending order.
    pub fn series_keys(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.series.keys().copied()
    }

    /// Returns the key of the series containing `id`, if any.
    pub fn series_key_of(&self, id: EventId) -> Option<NaiveDateTime> {
        self.series
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(key, _)| *key)
    }

    /// Removes every listed id from whichever series holds it and appends
    /// them, in their previous relative order, under `new_key`.
    ///
    /// Ids already listed under `new_key` keep their position.
    pub fn move_to_series(&mut self, ids: &[EventId], new_key: NaiveDateTime) {
        let mut moved = Vec::new();
        for (key, list) in self.series.iter_mut() {
            if *key == new_key {
                continue;
            }
            list.retain(|id| {
                let take = ids.contains(id);
                if take {
                    moved.push(*id);
                }
                !take
            });
        }
        self.series.retain(|_, list| !list.is_empty());
        if moved.is_empty() {
            return;
        }
        debug!(key = %new_key, count = moved.len(), "Moved events to series");
        self.series.entry(new_key).or_default().extend(moved);
    }
}
