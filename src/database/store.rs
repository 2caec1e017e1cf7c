//! Store traits shared by the PostgreSQL and in-memory backends
//!
//! Every operation that must be serialized at the data layer is expressed as a
//! single store call: admission (capacity check and insert), guarded status
//! transitions, the first-wins check-in flip and the snapshot upsert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::models::{
    AttendanceCounts, AttendanceSnapshot, CreateEventRequest, Event, EventStatus, LedgerCounts,
    Registration, UpdateEventRequest,
};
use crate::utils::errors::Result;

/// Admission rule evaluated while the event row is locked
pub type AdmissionRule = dyn Fn(&Event, &LedgerCounts) -> Result<()> + Send + Sync;

/// Update rule evaluated while the event row is locked: `(current, updated, confirmed_count)`
pub type UpdateRule = dyn Fn(&Event, &Event, i64) -> Result<()> + Send + Sync;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a new event in the request's initial status
    async fn insert_event(&self, request: &CreateEventRequest, organizer_id: i64, now: DateTime<Utc>) -> Result<Event>;

    async fn find_event(&self, event_id: i64) -> Result<Option<Event>>;

    /// Events in any of `statuses`, ordered by start date; all events when empty
    async fn list_events(&self, statuses: &[EventStatus]) -> Result<Vec<Event>>;

    /// Set `target` only if the status is still `expected`.
    ///
    /// Returns `false` when the guard matched nothing, which callers treat as
    /// "someone else already moved the event".
    async fn update_status_if(&self, event_id: i64, expected: EventStatus, target: EventStatus, now: DateTime<Utc>) -> Result<bool>;

    /// Apply `changes` after `rule` accepted them under the event lock
    async fn update_details(&self, event_id: i64, changes: &UpdateEventRequest, now: DateTime<Utc>, rule: &UpdateRule) -> Result<Event>;

    async fn delete_event(&self, event_id: i64) -> Result<bool>;
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Insert a CONFIRMED registration if `admit` accepts the locked ledger state
    async fn register_if_admitted(
        &self,
        event_id: i64,
        user_id: i64,
        qr_code: &str,
        now: DateTime<Utc>,
        admit: &AdmissionRule,
    ) -> Result<Registration>;

    async fn find_registration(&self, registration_id: i64) -> Result<Option<Registration>>;

    async fn find_by_qr_code(&self, event_id: i64, qr_code: &str) -> Result<Option<Registration>>;

    /// CONFIRMED and not checked in -> CANCELLED
    async fn cancel_if_confirmed(&self, registration_id: i64) -> Result<bool>;

    /// Flip `checked_in` false -> true; `false` when another scan won
    async fn mark_checked_in(&self, registration_id: i64, at: DateTime<Utc>) -> Result<bool>;

    async fn list_for_event(&self, event_id: i64) -> Result<Vec<Registration>>;

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Registration>>;

    async fn attendance_counts(&self, event_id: i64) -> Result<AttendanceCounts>;
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Create or overwrite the snapshot for `snapshot.event_id`
    async fn apply_snapshot(&self, snapshot: &AttendanceSnapshot) -> Result<AttendanceSnapshot>;

    async fn find_snapshot(&self, event_id: i64) -> Result<Option<AttendanceSnapshot>>;

    /// COMPLETED events whose snapshot was never written
    async fn completed_without_snapshot(&self) -> Result<Vec<i64>>;
}
