//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{CampusEventsError, Result};
use super::{Settings, StorageBackend};

/// Minimum QR token length accepted for registrations
const MIN_QR_CODE_LENGTH: usize = 16;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.storage.backend == StorageBackend::Postgres {
        validate_database_config(&settings.database)?;
    }
    validate_scheduler_config(&settings.scheduler)?;
    validate_registration_config(&settings.registration)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(CampusEventsError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(CampusEventsError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(CampusEventsError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate scheduler configuration
fn validate_scheduler_config(config: &super::SchedulerConfig) -> Result<()> {
    if config.sweep_interval_seconds == 0 {
        return Err(CampusEventsError::Config(
            "Sweep interval must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate registration configuration
fn validate_registration_config(config: &super::RegistrationConfig) -> Result<()> {
    if config.qr_code_length < MIN_QR_CODE_LENGTH {
        return Err(CampusEventsError::Config(
            format!("QR code length must be at least {}", MIN_QR_CODE_LENGTH)
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(CampusEventsError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(CampusEventsError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_sweep_interval() {
        let mut settings = Settings::default();
        settings.scheduler.sweep_interval_seconds = 0;
        assert!(matches!(validate_settings(&settings), Err(CampusEventsError::Config(_))));
    }

    #[test]
    fn test_memory_backend_skips_database_checks() {
        let mut settings = Settings::default();
        settings.database.url.clear();
        assert!(validate_settings(&settings).is_err());

        settings.storage.backend = StorageBackend::Memory;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_rejects_short_qr_codes_and_bad_levels() {
        let mut settings = Settings::default();
        settings.registration.qr_code_length = 8;
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings).is_err());
    }
}
