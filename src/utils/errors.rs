//! Error handling for EventDesk
//!
//! This module defines the main error type used throughout the application.
//! Validation and policy failures are not errors: services report them as
//! [`crate::models::ActionOutcome`] values so they can be shown to the user.
//! Everything in here aborts the action.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for EventDesk
#[derive(Error, Debug)]
pub enum EventDeskError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: Uuid },

    #[error("Attendee not found: {attendee_id}")]
    AttendeeNotFound { attendee_id: Uuid },

    #[error("Staff application not found: {application_id}")]
    ApplicationNotFound { application_id: Uuid },

    #[error("User not found: {email}")]
    UserNotFound { email: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Mail delivery error: {0}")]
    Mail(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for EventDesk operations
pub type Result<T> = std::result::Result<T, EventDeskError>;

impl EventDeskError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            EventDeskError::Database(_) => false,
            EventDeskError::Migration(_) => false,
            EventDeskError::Config(_) => false,
            EventDeskError::Unauthorized => false,
            EventDeskError::Forbidden(_) => false,
            EventDeskError::EventNotFound { .. } => false,
            EventDeskError::AttendeeNotFound { .. } => false,
            EventDeskError::ApplicationNotFound { .. } => false,
            EventDeskError::UserNotFound { .. } => false,
            EventDeskError::InvalidInput(_) => false,
            EventDeskError::Conflict(_) => false,
            EventDeskError::Mail(_) => true,
            EventDeskError::Storage(_) => true,
            EventDeskError::Geocoding(_) => true,
            EventDeskError::Http(_) => true,
            EventDeskError::Serialization(_) => false,
            EventDeskError::Csv(_) => false,
            EventDeskError::Io(_) => true,
            EventDeskError::UrlParse(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventDeskError::Database(_) => ErrorSeverity::Critical,
            EventDeskError::Migration(_) => ErrorSeverity::Critical,
            EventDeskError::Config(_) => ErrorSeverity::Critical,
            EventDeskError::Unauthorized => ErrorSeverity::Warning,
            EventDeskError::Forbidden(_) => ErrorSeverity::Warning,
            EventDeskError::InvalidInput(_) => ErrorSeverity::Info,
            EventDeskError::Conflict(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// True when the error reports a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EventDeskError::EventNotFound { .. }
                | EventDeskError::AttendeeNotFound { .. }
                | EventDeskError::ApplicationNotFound { .. }
                | EventDeskError::UserNotFound { .. }
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classification() {
        assert_eq!(EventDeskError::Unauthorized.severity(), ErrorSeverity::Warning);
        assert_eq!(EventDeskError::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert_eq!(EventDeskError::Mail("down".into()).severity(), ErrorSeverity::Error);
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
    }

    #[test]
    fn test_not_found_and_recoverable() {
        let err = EventDeskError::EventNotFound { event_id: Uuid::nil() };
        assert!(err.is_not_found());
        assert!(!err.is_recoverable());
        assert!(EventDeskError::Mail("timeout".into()).is_recoverable());
        assert!(!EventDeskError::Forbidden("no".into()).is_not_found());
    }
}
