//! Event types for calendars.
//!
//! This module provides the value types the engine stores and edits:
//! - [`Event`]: a timed, all-day or multi-day calendar event
//! - [`Location`] / [`Status`]: the two enumerated event attributes
//! - [`EventProperty`] / [`PropertyChange`]: what an edit targets and the typed new value
//!
//! Two events are duplicates when all six fields compare equal; hashing only
//! looks at subject, start and end, which is consistent with that equality.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};

/// Start time-of-day of an all-day event.
pub const ALL_DAY_START: NaiveTime = match NaiveTime::from_hms_opt(8, 0, 0) {
    Some(t) => t,
    None => unreachable!(),
};

/// End time-of-day of an all-day event.
pub const ALL_DAY_END: NaiveTime = match NaiveTime::from_hms_opt(17, 0, 0) {
    Some(t) => t,
    None => unreachable!(),
};

/// Format accepted for datetimes given as text (`2025-06-16T09:00`).
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parses a `YYYY-MM-DDTHH:MM` datetime.
pub fn parse_datetime(value: &str) -> CalendarResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_FORMAT)
        .map_err(|e| CalendarError::validation(format!("invalid datetime '{value}': {e}")))
}

/// Where an event takes place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    #[default]
    Online,
    Physical,
}

impl Location {
    /// Parses a location token, ignoring case.
    pub fn parse(value: &str) -> CalendarResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "physical" => Ok(Self::Physical),
            _ => Err(CalendarError::validation(format!(
                "unknown location '{value}' (expected online or physical)"
            ))),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Physical => write!(f, "physical"),
        }
    }
}

impl FromStr for Location {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Visibility of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Public,
    Private,
}

impl Status {
    /// Parses a status token, ignoring case.
    pub fn parse(value: &str) -> CalendarResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            _ => Err(CalendarError::validation(format!(
                "unknown status '{value}' (expected public or private)"
            ))),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

impl FromStr for Status {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An editable event property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventProperty {
    Subject,
    Start,
    End,
    Description,
    Location,
    Status,
}

impl EventProperty {
    /// Parses a property name, ignoring case.
    pub fn parse(value: &str) -> CalendarResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "subject" => Ok(Self::Subject),
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            "description" => Ok(Self::Description),
            "location" => Ok(Self::Location),
            "status" => Ok(Self::Status),
            _ => Err(CalendarError::validation(format!(
                "unknown event property '{value}'"
            ))),
        }
    }
}

impl fmt::Display for EventProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subject => "subject",
            Self::Start => "start",
            Self::End => "end",
            Self::Description => "description",
            Self::Location => "location",
            Self::Status => "status",
        };
        f.write_str(name)
    }
}

impl FromStr for EventProperty {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A property together with the value it should take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyChange {
    Subject(String),
    Start(NaiveDateTime),
    End(NaiveDateTime),
    Description(String),
    Location(Location),
    Status(Status),
}

impl PropertyChange {
    /// Builds a change from a property and its textual new value.
    ///
    /// Location and status tokens are parsed case-insensitively; start and
    /// end values use [`DATETIME_FORMAT`].
    pub fn parse(property: EventProperty, value: &str) -> CalendarResult<Self> {
        Ok(match property {
            EventProperty::Subject => Self::Subject(value.to_string()),
            EventProperty::Description => Self::Description(value.to_string()),
            EventProperty::Location => Self::Location(Location::parse(value)?),
            EventProperty::Status => Self::Status(Status::parse(value)?),
            EventProperty::Start => Self::Start(parse_datetime(value)?),
            EventProperty::End => Self::End(parse_datetime(value)?),
        })
    }

    /// Returns the property this change targets.
    pub fn property(&self) -> EventProperty {
        match self {
            Self::Subject(_) => EventProperty::Subject,
            Self::Start(_) => EventProperty::Start,
            Self::End(_) => EventProperty::End,
            Self::Description(_) => EventProperty::Description,
            Self::Location(_) => EventProperty::Location,
            Self::Status(_) => EventProperty::Status,
        }
    }
}

/// A calendar event.
///
/// An all-day event is one running from 08:00 to 17:00 on a single date;
/// that is derived from the times, not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The event title.
    pub subject: String,
    /// When the event starts (local to the owning calendar).
    pub start: NaiveDateTime,
    /// When the event ends (exclusive).
    pub end: NaiveDateTime,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Online or physical.
    #[serde(default)]
    pub location: Location,
    /// Public or private.
    #[serde(default)]
    pub status: Status,
}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.subject.hash(state);
        self.start.hash(state);
        self.end.hash(state);
    }
}

impl Event {
    /// Creates a new event with default description, location and status.
    pub fn new(subject: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            subject: subject.into(),
            start,
            end,
            description: String::new(),
            location: Location::default(),
            status: Status::default(),
        }
    }

    /// Creates an all-day event on the given date.
    pub fn all_day(subject: impl Into<String>, date: NaiveDate) -> Self {
        let (start, end) = all_day_span(date);
        Self::new(subject, start, end)
    }

    /// Creates an event, normalizing a missing end to the all-day window of
    /// the start's date.
    pub fn with_optional_end(
        subject: impl Into<String>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Self {
        match end {
            Some(end) => Self::new(subject, start, end),
            None => Self::all_day(subject, start.date()),
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Returns an error unless the end is strictly after the start.
    pub fn validate(&self) -> CalendarResult<()> {
        if self.end <= self.start {
            return Err(CalendarError::validation(format!(
                "event '{}' must end after it starts ({} >= {})",
                self.subject, self.start, self.end
            )));
        }
        Ok(())
    }

    /// Returns true if this is an all-day event.
    pub fn is_all_day(&self) -> bool {
        self.start.date() == self.end.date()
            && self.start.time() == ALL_DAY_START
            && self.end.time() == ALL_DAY_END
    }

    /// Returns true if the event spans more than one calendar date.
    pub fn is_multi_day(&self) -> bool {
        self.start.date() != self.end.date()
    }

    /// Returns the event's duration.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns every date the event touches, from start date to end date.
    pub fn spans(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.end.date();
        self.start
            .date()
            .iter_days()
            .take_while(move |day| *day <= last)
    }

    /// Checks if the event is in progress at the given instant.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn occurs_at(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Returns a copy of this event with `change` applied, without validation.
    ///
    /// A start change keeps the duration; an end change sets the end as-is.
    pub fn with_change(&self, change: &PropertyChange) -> Self {
        let mut updated = self.clone();
        match change {
            PropertyChange::Subject(subject) => updated.subject = subject.clone(),
            PropertyChange::Description(text) => updated.description = text.clone(),
            PropertyChange::Location(location) => updated.location = *location,
            PropertyChange::Status(status) => updated.status = *status,
            PropertyChange::Start(start) => {
                updated.end = *start + self.duration();
                updated.start = *start;
            }
            PropertyChange::End(end) => updated.end = *end,
        }
        updated
    }
}

/// Returns the 08:00 to 17:00 span of `date`.
pub fn all_day_span(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    (date.and_time(ALL_DAY_START), date.and_time(ALL_DAY_END))
}
