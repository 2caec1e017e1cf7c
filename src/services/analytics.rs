//! Analytics aggregator
//!
//! Derives the attendance snapshot from the registration ledger and applies it
//! as an idempotent upsert. The snapshot is a view, never a source of truth.

use crate::database::DatabaseService;
use crate::models::AttendanceSnapshot;
use crate::services::auth::{Action, Actor, AuthService, Resource};
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::logging::log_analytics;

#[derive(Clone)]
pub struct AnalyticsAggregator {
    db: DatabaseService,
    auth: AuthService,
}

impl AnalyticsAggregator {
    pub fn new(db: DatabaseService, auth: AuthService) -> Self {
        Self { db, auth }
    }

    /// Recompute and apply the snapshot for one event
    pub async fn recompute(&self, event_id: i64) -> Result<AttendanceSnapshot> {
        let event = self
            .db
            .events
            .find_event(event_id)
            .await?
            .ok_or(CampusEventsError::EventNotFound { event_id })?;

        let counts = self.db.registrations.attendance_counts(event_id).await?;
        let snapshot = AttendanceSnapshot::derive(&event, counts.confirmed, counts.checked_in);
        let stored = self.db.analytics.apply_snapshot(&snapshot).await?;

        log_analytics(event_id, stored.total_registrations, stored.total_attendees, stored.attendance_rate);
        Ok(stored)
    }

    /// Stored snapshot, if one was ever applied
    pub async fn get_snapshot(&self, event_id: i64) -> Result<Option<AttendanceSnapshot>> {
        self.db.analytics.find_snapshot(event_id).await
    }

    /// Stored snapshot for an actor allowed to view the event's analytics
    pub async fn get_snapshot_as(&self, actor: &Actor, event_id: i64) -> Result<Option<AttendanceSnapshot>> {
        let event = self
            .db
            .events
            .find_event(event_id)
            .await?
            .ok_or(CampusEventsError::EventNotFound { event_id })?;
        self.auth.authorize(actor, Action::ViewAnalytics, &Resource::event(&event))?;

        self.get_snapshot(event_id).await
    }
}
