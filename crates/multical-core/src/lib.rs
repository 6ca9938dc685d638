//! Calendar engine: named calendars, events, weekly series, edits,
//! queries and cross-calendar copy

pub mod calendar;
pub mod config;
pub mod copy;
pub mod edit;
pub mod error;
pub mod event;
pub mod format;
pub mod query;
pub mod recurrence;
pub mod registry;
pub mod store;
pub mod tracing;

pub use calendar::{SpecificCalendar, parse_timezone};
pub use config::{CalendarSettings, ConfigError, DisplaySettings, EngineConfig, LoggingSettings};
pub use copy::convert_timezone;
pub use error::{CalendarError, CalendarResult, EVENT_EXISTS, ErrorKind};
pub use event::{
    ALL_DAY_END, ALL_DAY_START, DATETIME_FORMAT, Event, EventProperty, Location, PropertyChange,
    Status, parse_datetime,
};
pub use format::{format_event, format_events};
pub use query::Availability;
pub use recurrence::{RepeatBound, WeekdaySet, weekday_from_code};
pub use registry::{CalendarHandle, CalendarProperty, CalendarRegistry, Session};
pub use store::{EventId, EventStore};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
