//! Registration model and check-in classification

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "registration_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Confirmed => "CONFIRMED",
            RegistrationStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub status: RegistrationStatus,
    pub qr_code: String,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn is_active(&self) -> bool {
        self.status != RegistrationStatus::Cancelled
    }
}

/// Ledger state for one event as seen inside the admission critical section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCounts {
    /// CONFIRMED registrations for the event
    pub confirmed: i64,
    /// The requesting user already holds a non-cancelled registration
    pub user_has_active: bool,
}

/// Timing label attached to a check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckInClassification {
    Early,
    OnTime,
    Late,
    Already,
}

impl CheckInClassification {
    /// Classify a first check-in at `now` against the event window.
    /// Both window ends are inclusive for ONTIME.
    pub fn for_window(now: DateTime<Utc>, start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Self {
        if now < start_date {
            CheckInClassification::Early
        } else if now <= end_date {
            CheckInClassification::OnTime
        } else {
            CheckInClassification::Late
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInClassification::Early => "EARLY",
            CheckInClassification::OnTime => "ONTIME",
            CheckInClassification::Late => "LATE",
            CheckInClassification::Already => "ALREADY",
        }
    }
}

impl fmt::Display for CheckInClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a check-in scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInOutcome {
    pub registration: Registration,
    pub classification: CheckInClassification,
}
