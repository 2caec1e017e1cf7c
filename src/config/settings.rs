//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub scheduler: SchedulerConfig,
    pub registration: RegistrationConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Which store implementation backs the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Lifecycle sweep configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub sweep_interval_seconds: u64,
    pub run_on_startup: bool,
}

/// Registration ledger configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationConfig {
    pub qr_code_length: usize,
}

/// Notification dispatch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub sender: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from a specific file (extension optional) layered over defaults
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CAMPUSEVENTS").separator("__").try_parsing(true))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::CampusEventsError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/campus_events".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
            },
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
            },
            scheduler: SchedulerConfig {
                enabled: true,
                sweep_interval_seconds: 60,
                run_on_startup: true,
            },
            registration: RegistrationConfig {
                qr_code_length: 32,
            },
            notifications: NotificationConfig {
                enabled: true,
                sender: "campus-events".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_prefix: "campus-events.log".to_string(),
                json: false,
            },
        }
    }
}
