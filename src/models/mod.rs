//! Data models module
//!
//! This module contains all data structures used throughout the engine

pub mod event;
pub mod registration;
pub mod analytics;
pub mod notification;

// Re-export commonly used models
pub use event::{Event, EventStatus, CreateEventRequest, UpdateEventRequest};
pub use registration::{Registration, RegistrationStatus, LedgerCounts, CheckInClassification, CheckInOutcome};
pub use analytics::{AttendanceSnapshot, AttendanceCounts};
pub use notification::{DomainNotification, NotificationKind};
