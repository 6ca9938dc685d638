//! Engine error types.

use thiserror::Error;

/// Result type for calendar engine operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Message carried by every structural-duplicate failure.
pub const EVENT_EXISTS: &str = "Event already exists";

/// Errors that can occur in the calendar engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// Malformed or illegal value (date ordering, enum token, timezone, ...).
    #[error("invalid input: {message}")]
    Validation { message: String },

    /// A calendar or event could not be found.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// A calendar name or a structurally equal event already exists.
    #[error("{message}")]
    Duplicate { message: String },

    /// The operation needs an active calendar and none is selected.
    #[error("{message}")]
    State { message: String },
}

/// The error taxonomy without the attached message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    State,
}

impl CalendarError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a duplicate error.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            message: message.into(),
        }
    }

    /// Creates the duplicate error raised for structurally equal events.
    pub fn event_exists() -> Self {
        Self::duplicate(EVENT_EXISTS)
    }

    /// Creates the error raised when no calendar is in use.
    pub fn no_active_calendar() -> Self {
        Self::State {
            message: "no calendar in use; select one first".to_string(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Duplicate { .. } => ErrorKind::Duplicate,
            Self::State { .. } => ErrorKind::State,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(CalendarError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(CalendarError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(CalendarError::event_exists().kind(), ErrorKind::Duplicate);
        assert_eq!(CalendarError::no_active_calendar().kind(), ErrorKind::State);
    }

    #[test]
    fn display() {
        assert_eq!(CalendarError::event_exists().to_string(), "Event already exists");
        assert_eq!(
            CalendarError::not_found("calendar 'work'").to_string(),
            "not found: calendar 'work'"
        );
        assert_eq!(
            CalendarError::validation("end must be after start").to_string(),
            "invalid input: end must be after start"
        );
    }
}
