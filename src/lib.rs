//! EventDesk
//!
//! Event registration and check-in service: organizers publish events,
//! attendees register and check in at the door by phone number, and
//! volunteers apply to staff events. This library holds the rule engine,
//! its storage backends and the mail, calendar, export and upload
//! integrations around it.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EventDeskError, Result};

// Re-export main components for easy access
pub use database::{DatabaseService, MemoryStore};
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
