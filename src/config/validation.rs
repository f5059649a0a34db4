//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{EventDeskError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_site_config(&settings.site)?;
    validate_mail_config(&settings.mail)?;
    validate_storage_config(&settings.storage)?;
    validate_geocoder_config(&settings.geocoder)?;
    validate_reminder_config(&settings.reminder)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EventDeskError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(EventDeskError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventDeskError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate identity configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if !config.super_admin_email.contains('@') {
        return Err(EventDeskError::Config(
            "Super admin email must be a valid address".to_string()
        ));
    }

    if config.super_admin_email == config.guest_email {
        return Err(EventDeskError::Config(
            "Guest email cannot be the super admin email".to_string()
        ));
    }

    if config.guest_passcode.len() < 4 {
        return Err(EventDeskError::Config(
            "Guest passcode must be at least 4 characters".to_string()
        ));
    }

    Ok(())
}

/// Validate public site configuration
fn validate_site_config(config: &super::SiteConfig) -> Result<()> {
    url::Url::parse(&config.base_url)
        .map_err(|e| EventDeskError::Config(format!("Invalid site base URL: {}", e)))?;

    if config.utc_offset_minutes.abs() > 14 * 60 {
        return Err(EventDeskError::Config(
            "UTC offset must be within +/-14 hours".to_string()
        ));
    }

    Ok(())
}

/// Validate mail configuration
fn validate_mail_config(config: &super::MailConfig) -> Result<()> {
    if let Some(api_url) = &config.api_url {
        url::Url::parse(api_url)
            .map_err(|e| EventDeskError::Config(format!("Invalid mail API URL: {}", e)))?;

        if config.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(EventDeskError::Config(
                "Mail API key is required when a mail API URL is set".to_string()
            ));
        }
    }

    if config.from_address.is_empty() {
        return Err(EventDeskError::Config(
            "Mail from address is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(EventDeskError::Config(
            "Mail timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate image storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    if config.upload_dir.is_empty() {
        return Err(EventDeskError::Config(
            "Upload directory is required".to_string()
        ));
    }

    if config.max_bytes == 0 {
        return Err(EventDeskError::Config(
            "Maximum upload size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate geocoder configuration
fn validate_geocoder_config(config: &super::GeocoderConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    url::Url::parse(&config.base_url)
        .map_err(|e| EventDeskError::Config(format!("Invalid geocoder URL: {}", e)))?;

    if config.timeout_seconds == 0 {
        return Err(EventDeskError::Config(
            "Geocoder timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate reminder job configuration
fn validate_reminder_config(config: &super::ReminderConfig) -> Result<()> {
    if config.lookahead_hours <= 0 {
        return Err(EventDeskError::Config(
            "Reminder lookahead must be a positive number of hours".to_string()
        ));
    }

    if config.interval_seconds == 0 {
        return Err(EventDeskError::Config(
            "Reminder interval must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventDeskError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EventDeskError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
