//! Attendance snapshot model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::models::event::Event;
use crate::utils::helpers::percentage;

/// Derived attendance metrics for one event (one row per event)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AttendanceSnapshot {
    pub event_id: i64,
    pub total_registrations: i64,
    pub total_attendees: i64,
    pub attendance_rate: f64,
    pub completed_at: DateTime<Utc>,
}

impl AttendanceSnapshot {
    /// Derive the snapshot from ledger counts.
    ///
    /// Depends only on its inputs, so equal ledger state yields an equal snapshot.
    pub fn derive(event: &Event, total_registrations: i64, total_attendees: i64) -> Self {
        Self {
            event_id: event.id,
            total_registrations,
            total_attendees,
            attendance_rate: percentage(total_attendees, total_registrations),
            completed_at: event.completed_at.unwrap_or(event.end_date),
        }
    }
}

/// Counts read from the ledger for snapshot derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttendanceCounts {
    pub confirmed: i64,
    pub checked_in: i64,
}
