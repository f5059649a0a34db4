//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod event;
pub mod attendee;
pub mod staff;

// Re-export repositories
pub use user::UserRepository;
pub use event::EventRepository;
pub use attendee::AttendeeRepository;
pub use staff::StaffRepository;

use crate::utils::errors::EventDeskError;

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`
pub(crate) fn conflict_or_database(error: sqlx::Error, what: &str) -> EventDeskError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return EventDeskError::Conflict(format!("{} already exists", what));
        }
    }
    EventDeskError::Database(error)
}
