//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the lifecycle and attendance engine.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{CampusEventsError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file appender when dropped and must be
/// held for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(stdout_layer)
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| CampusEventsError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event management actions
pub fn log_event_action(event_id: i64, action: &str, user_id: i64, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        user_id = user_id,
        details = details,
        "Event action performed"
    );
}

/// Log a status transition applied to an event
pub fn log_status_transition(event_id: i64, from: &str, to: &str, applied: bool) {
    if applied {
        info!(event_id = event_id, from = from, to = to, "Event status transitioned");
    } else {
        debug!(event_id = event_id, from = from, to = to, "Status transition already applied elsewhere");
    }
}

/// Log registration ledger changes
pub fn log_registration(event_id: i64, user_id: i64, registration_id: i64, action: &str) {
    info!(
        event_id = event_id,
        user_id = user_id,
        registration_id = registration_id,
        action = action,
        "Registration ledger updated"
    );
}

/// Log rejected registrations
pub fn log_registration_rejected(event_id: i64, user_id: i64, reason: &str) {
    debug!(
        event_id = event_id,
        user_id = user_id,
        reason = reason,
        "Registration rejected"
    );
}

/// Log check-in results
pub fn log_check_in(event_id: i64, registration_id: i64, classification: &str) {
    info!(
        event_id = event_id,
        registration_id = registration_id,
        classification = classification,
        "Check-in recorded"
    );
}

/// Log sweep summaries
pub fn log_sweep(started: usize, completed: usize, analytics_retried: usize, failures: usize) {
    if failures > 0 {
        warn!(
            started = started,
            completed = completed,
            analytics_retried = analytics_retried,
            failures = failures,
            "Lifecycle sweep finished with failures"
        );
    } else {
        info!(
            started = started,
            completed = completed,
            analytics_retried = analytics_retried,
            "Lifecycle sweep finished"
        );
    }
}

/// Log analytics recomputation
pub fn log_analytics(event_id: i64, total_registrations: i64, total_attendees: i64, attendance_rate: f64) {
    info!(
        event_id = event_id,
        total_registrations = total_registrations,
        total_attendees = total_attendees,
        attendance_rate = attendance_rate,
        "Attendance snapshot applied"
    );
}

/// Log authorization denials
pub fn log_access_denied(user_id: i64, action: &str, details: Option<&str>) {
    warn!(
        user_id = user_id,
        action = action,
        details = details,
        "Authorization denied"
    );
}

/// Log errors from background work with context
pub fn log_background_error(task: &str, error: &CampusEventsError, event_id: Option<i64>) {
    error!(
        task = task,
        event_id = event_id,
        error = %error,
        severity = %error.severity(),
        "Background task failed"
    );
}
