//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod event;
pub mod attendee;
pub mod staff;
pub mod outcome;

// Re-export commonly used models
pub use user::{User, CreateUserRequest, UserRole};
pub use event::{Event, EventDetails, EventLifecycle, CreateEventRequest, ONLINE_LOCATION, RESTORE_WINDOW_DAYS};
pub use attendee::{Attendee, CreateAttendeeRequest, PhoneLookup};
pub use staff::{StaffApplication, StaffStatus, CreateStaffApplicationRequest};
pub use outcome::{ActionOutcome, messages};
