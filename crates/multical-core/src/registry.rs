//! The set of calendars and the session selecting one of them.
//!
//! [`CalendarRegistry`] owns every [`SpecificCalendar`] and keeps names
//! unique. [`Session`] wraps a registry with the handle of the calendar
//! in use; single-calendar operations go through
//! [`Session::calendar`] / [`Session::calendar_mut`], which fail with a
//! state error until [`Session::use_calendar`] has been called.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::calendar::{SpecificCalendar, parse_timezone};
use crate::config::{DisplaySettings, EngineConfig};
use crate::error::{CalendarError, CalendarResult};

/// Stable handle to a calendar in a [`CalendarRegistry`].
///
/// Calendars are never removed, so a handle stays valid across renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarHandle(usize);

/// An editable calendar property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarProperty {
    Name,
    Timezone,
}

impl CalendarProperty {
    /// Parses a property name, ignoring case.
    pub fn parse(value: &str) -> CalendarResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "timezone" => Ok(Self::Timezone),
            _ => Err(CalendarError::validation(format!(
                "unknown calendar property '{value}'"
            ))),
        }
    }
}

impl fmt::Display for CalendarProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Timezone => write!(f, "timezone"),
        }
    }
}

impl FromStr for CalendarProperty {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// All calendars, in creation order.
#[derive(Debug, Clone, Default)]
pub struct CalendarRegistry {
    calendars: Vec<SpecificCalendar>,
    display: DisplaySettings,
}

impl CalendarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the display settings given to new calendars.
    pub fn with_display(mut self, display: DisplaySettings) -> Self {
        self.display = display;
        self
    }

    pub fn len(&self) -> usize {
        self.calendars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty()
    }

    /// Creates a calendar. Names are unique and matched exactly.
    pub fn add_calendar(&mut self, name: &str, timezone: &str) -> CalendarResult<CalendarHandle> {
        if self.find(name).is_some() {
            return Err(CalendarError::duplicate(format!(
                "calendar '{name}' already exists"
            )));
        }
        let tz = parse_timezone(timezone)?;
        let handle = CalendarHandle(self.calendars.len());
        self.calendars
            .push(SpecificCalendar::new(name, tz).with_display(self.display.clone()));
        info!(calendar = name, timezone = %tz, "Created calendar");
        Ok(handle)
    }

    /// Renames a calendar or changes its timezone.
    ///
    /// Renaming a calendar to its current name does nothing. Changing the
    /// timezone leaves existing event times as they are.
    pub fn edit_calendar(
        &mut self,
        name: &str,
        property: CalendarProperty,
        value: &str,
    ) -> CalendarResult<()> {
        let handle = self.handle(name)?;
        match property {
            CalendarProperty::Name => {
                if value == name {
                    return Ok(());
                }
                if self.find(value).is_some() {
                    return Err(CalendarError::duplicate(format!(
                        "calendar '{value}' already exists"
                    )));
                }
                self.calendars[handle.0].set_name(value);
            }
            CalendarProperty::Timezone => {
                let tz = parse_timezone(value)?;
                self.calendars[handle.0].set_timezone(tz);
            }
        }
        info!(calendar = name, property = %property, value, "Edited calendar");
        Ok(())
    }

    /// Finds a calendar by exact name.
    pub fn find(&self, name: &str) -> Option<CalendarHandle> {
        self.calendars
            .iter()
            .position(|c| c.name() == name)
            .map(CalendarHandle)
    }

    /// Like [`find`](Self::find), failing with a not found error.
    pub fn handle(&self, name: &str) -> CalendarResult<CalendarHandle> {
        self.find(name)
            .ok_or_else(|| CalendarError::not_found(format!("calendar '{name}'")))
    }

    pub fn get(&self, handle: CalendarHandle) -> Option<&SpecificCalendar> {
        self.calendars.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: CalendarHandle) -> Option<&mut SpecificCalendar> {
        self.calendars.get_mut(handle.0)
    }

    /// Gets a calendar by name.
    pub fn by_name(&self, name: &str) -> CalendarResult<&SpecificCalendar> {
        let handle = self.handle(name)?;
        Ok(&self.calendars[handle.0])
    }

    /// Gets a calendar by name, mutably.
    pub fn by_name_mut(&mut self, name: &str) -> CalendarResult<&mut SpecificCalendar> {
        let handle = self.handle(name)?;
        Ok(&mut self.calendars[handle.0])
    }

    /// Iterates calendars in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &SpecificCalendar> {
        self.calendars.iter()
    }
}

/// A registry plus the calendar currently in use.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(crate) registry: CalendarRegistry,
    current: Option<CalendarHandle>,
}

impl Session {
    /// Creates a session with no calendars.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session over an existing registry, with nothing selected.
    pub fn with_registry(registry: CalendarRegistry) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// Builds a session from configuration: creates the configured
    /// calendars, then selects the active one if given.
    pub fn from_config(config: &EngineConfig) -> CalendarResult<Self> {
        let registry = CalendarRegistry::new().with_display(config.display.clone());
        let mut session = Self::with_registry(registry);
        for calendar in &config.calendars {
            session.add_calendar(&calendar.name, &calendar.timezone)?;
        }
        if let Some(ref name) = config.active_calendar {
            session.use_calendar(name)?;
        }
        debug!(calendars = session.registry.len(), "Session initialized from config");
        Ok(session)
    }

    pub fn registry(&self) -> &CalendarRegistry {
        &self.registry
    }

    pub fn add_calendar(&mut self, name: &str, timezone: &str) -> CalendarResult<CalendarHandle> {
        self.registry.add_calendar(name, timezone)
    }

    pub fn edit_calendar(
        &mut self,
        name: &str,
        property: CalendarProperty,
        value: &str,
    ) -> CalendarResult<()> {
        self.registry.edit_calendar(name, property, value)
    }

    /// Selects the calendar used by single-calendar operations.
    pub fn use_calendar(&mut self, name: &str) -> CalendarResult<()> {
        let handle = self.registry.handle(name)?;
        self.current = Some(handle);
        info!(calendar = name, "Using calendar");
        Ok(())
    }

    /// Calendars in creation order.
    pub fn list_calendars(&self) -> Vec<&SpecificCalendar> {
        self.registry.iter().collect()
    }

    /// The calendar in use.
    pub fn current_calendar(&self) -> CalendarResult<&SpecificCalendar> {
        self.current
            .and_then(|h| self.registry.get(h))
            .ok_or_else(CalendarError::no_active_calendar)
    }

    /// Alias for [`current_calendar`](Self::current_calendar).
    pub fn calendar(&self) -> CalendarResult<&SpecificCalendar> {
        self.current_calendar()
    }

    /// The calendar in use, mutably.
    pub fn calendar_mut(&mut self) -> CalendarResult<&mut SpecificCalendar> {
        self.current
            .and_then(|h| self.registry.get_mut(h))
            .ok_or_else(CalendarError::no_active_calendar)
    }

    pub(crate) fn current_handle(&self) -> CalendarResult<CalendarHandle> {
        self.current.ok_or_else(CalendarError::no_active_calendar)
    }
}
