//! Error handling for CampusEvents
//!
//! This module defines the main error type used throughout the engine
//! and maps every variant onto the coarse taxonomy exposed to callers.

use thiserror::Error;

/// Main error type for the CampusEvents engine
#[derive(Error, Debug)]
pub enum CampusEventsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Registration not found: {0}")]
    RegistrationNotFound(String),

    #[error("Event {event_id} is full")]
    EventFull { event_id: i64 },

    #[error("User {user_id} is already registered for event {event_id}")]
    AlreadyRegistered { event_id: i64, user_id: i64 },

    #[error("Registration for event {event_id} is closed")]
    RegistrationClosed { event_id: i64 },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Event {event_id} has ended and can no longer be modified")]
    PastEventImmutable { event_id: i64 },

    #[error("Event {event_id} has not ended yet")]
    EventNotEnded { event_id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for CampusEvents operations
pub type Result<T> = std::result::Result<T, CampusEventsError>;

/// Coarse error taxonomy shared by every operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    Validation,
    Internal,
}

impl CampusEventsError {
    /// Classify the error into the caller-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            CampusEventsError::EventNotFound { .. }
            | CampusEventsError::RegistrationNotFound(_) => ErrorKind::NotFound,
            CampusEventsError::EventFull { .. }
            | CampusEventsError::AlreadyRegistered { .. }
            | CampusEventsError::RegistrationClosed { .. }
            | CampusEventsError::InvalidTransition { .. }
            | CampusEventsError::PastEventImmutable { .. }
            | CampusEventsError::EventNotEnded { .. }
            | CampusEventsError::Conflict(_) => ErrorKind::Conflict,
            CampusEventsError::PermissionDenied(_) => ErrorKind::Forbidden,
            CampusEventsError::Validation(_) => ErrorKind::Validation,
            CampusEventsError::Database(_)
            | CampusEventsError::Migration(_)
            | CampusEventsError::Config(_)
            | CampusEventsError::Serialization(_)
            | CampusEventsError::Io(_)
            | CampusEventsError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status code used by the request surface
    pub fn status_code(&self) -> u16 {
        match self {
            // Registration rule violations and premature completion are client errors
            CampusEventsError::EventFull { .. }
            | CampusEventsError::AlreadyRegistered { .. }
            | CampusEventsError::RegistrationClosed { .. }
            | CampusEventsError::EventNotEnded { .. } => 400,
            _ => match self.kind() {
                ErrorKind::NotFound => 404,
                ErrorKind::Conflict => 409,
                ErrorKind::Forbidden => 403,
                ErrorKind::Validation => 400,
                ErrorKind::Internal => 500,
            },
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            CampusEventsError::EventNotFound { .. }
            | CampusEventsError::RegistrationNotFound(_) => "NotFound",
            CampusEventsError::EventFull { .. } => "EventFull",
            CampusEventsError::AlreadyRegistered { .. } => "AlreadyRegistered",
            CampusEventsError::RegistrationClosed { .. } => "RegistrationClosed",
            CampusEventsError::InvalidTransition { .. } => "InvalidTransition",
            CampusEventsError::PastEventImmutable { .. } => "PastEventImmutable",
            CampusEventsError::EventNotEnded { .. } => "EventNotEnded",
            CampusEventsError::Conflict(_) => "Conflict",
            CampusEventsError::PermissionDenied(_) => "Forbidden",
            CampusEventsError::Validation(_) => "ValidationError",
            _ => "Internal",
        }
    }

    /// Check if the error is recoverable by retrying later
    pub fn is_recoverable(&self) -> bool {
        match self {
            CampusEventsError::Database(_) => true,
            CampusEventsError::Io(_) => true,
            CampusEventsError::Internal(_) => true,
            CampusEventsError::Migration(_) => false,
            CampusEventsError::Config(_) => false,
            CampusEventsError::Serialization(_) => false,
            _ => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CampusEventsError::Database(_) => ErrorSeverity::Critical,
            CampusEventsError::Migration(_) => ErrorSeverity::Critical,
            CampusEventsError::Config(_) => ErrorSeverity::Critical,
            CampusEventsError::PermissionDenied(_) => ErrorSeverity::Warning,
            CampusEventsError::Validation(_) => ErrorSeverity::Info,
            _ => match self.kind() {
                ErrorKind::NotFound | ErrorKind::Conflict => ErrorSeverity::Info,
                _ => ErrorSeverity::Error,
            },
        }
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
    fn test_registration_rules_map_to_bad_request() {
        assert_eq!(CampusEventsError::EventFull { event_id: 1 }.status_code(), 400);
        assert_eq!(CampusEventsError::AlreadyRegistered { event_id: 1, user_id: 2 }.status_code(), 400);
        assert_eq!(CampusEventsError::RegistrationClosed { event_id: 1 }.status_code(), 400);
        assert_eq!(CampusEventsError::EventNotEnded { event_id: 1 }.status_code(), 400);
    }

    #[test]
    fn test_taxonomy() {
        assert_eq!(CampusEventsError::EventNotFound { event_id: 1 }.kind(), ErrorKind::NotFound);
        assert_eq!(CampusEventsError::PastEventImmutable { event_id: 1 }.kind(), ErrorKind::Conflict);
        assert_eq!(CampusEventsError::PastEventImmutable { event_id: 1 }.status_code(), 409);
        assert_eq!(CampusEventsError::PermissionDenied("no".into()).status_code(), 403);
        assert_eq!(CampusEventsError::Internal("boom".into()).kind(), ErrorKind::Internal);
        assert!(CampusEventsError::Internal("boom".into()).is_recoverable());
        assert!(!CampusEventsError::EventFull { event_id: 1 }.is_recoverable());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(CampusEventsError::Config("x".into()).severity().to_string(), "CRITICAL");
        assert_eq!(CampusEventsError::PermissionDenied("x".into()).severity(), ErrorSeverity::Warning);
    }
}
