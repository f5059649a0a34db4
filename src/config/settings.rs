//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub site: SiteConfig,
    pub mail: MailConfig,
    pub storage: StorageConfig,
    pub geocoder: GeocoderConfig,
    pub checkin: CheckInConfig,
    pub reminder: ReminderConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Identity configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// The root identity; its role can never be changed
    pub super_admin_email: String,
    /// Email carried by the shared-passcode guest session
    pub guest_email: String,
    pub guest_passcode: String,
}

/// Public site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub base_url: String,
    /// Offset of the organizers' local time from UTC, in minutes
    pub utc_offset_minutes: i32,
}

/// Transactional mail configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// HTTP mail API endpoint. Unset means mail is only logged.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from_address: String,
    pub organizer_name: String,
    pub organizer_email: String,
    pub timeout_seconds: u64,
}

/// Image upload configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub public_prefix: String,
    pub max_bytes: usize,
}

/// Address geocoder configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocoderConfig {
    pub enabled: bool,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

/// How check-in compares the entered phone against registrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneMatchMode {
    /// Compare digits-only keys, so "0912-345-678" matches "0912345678"
    Normalized,
    /// Compare the raw strings as typed
    Exact,
}

/// Check-in configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckInConfig {
    pub phone_match: PhoneMatchMode,
}

/// Creator reminder job configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub lookahead_hours: i64,
    pub interval_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for daily rolling log files; stdout only when unset
    pub directory: Option<String>,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("EVENTDESK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::EventDeskError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/eventdesk".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            auth: AuthConfig {
                super_admin_email: "root@eventdesk.local".to_string(),
                guest_email: "guest@example.com".to_string(),
                guest_passcode: "8888".to_string(),
            },
            site: SiteConfig {
                base_url: "http://localhost:3000".to_string(),
                utc_offset_minutes: 480,
            },
            mail: MailConfig {
                api_url: None,
                api_key: None,
                from_address: "Event System <noreply@example.com>".to_string(),
                organizer_name: "Event Organizer".to_string(),
                organizer_email: "organizer@example.com".to_string(),
                timeout_seconds: 10,
            },
            storage: StorageConfig {
                upload_dir: "public/uploads".to_string(),
                public_prefix: "/uploads".to_string(),
                max_bytes: 2 * 1024 * 1024,
            },
            geocoder: GeocoderConfig {
                enabled: true,
                base_url: "https://nominatim.openstreetmap.org".to_string(),
                user_agent: "EventDesk/1.0".to_string(),
                timeout_seconds: 5,
            },
            checkin: CheckInConfig {
                phone_match: PhoneMatchMode::Normalized,
            },
            reminder: ReminderConfig {
                enabled: true,
                lookahead_hours: 48,
                interval_seconds: 3600,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.storage.max_bytes, 2_097_152);
        assert_eq!(settings.checkin.phone_match, PhoneMatchMode::Normalized);
    }

    #[test]
    fn test_phone_match_mode_deserializes_lowercase() {
        let mode: PhoneMatchMode = serde_json::from_str("\"exact\"").unwrap();
        assert_eq!(mode, PhoneMatchMode::Exact);
    }
}
