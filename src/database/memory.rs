//! In-memory store backend
//!
//! Implements every store trait over a single mutex-guarded state, so each
//! store call is one critical section with the same atomicity the PostgreSQL
//! backend gets from row locks and conditional updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use crate::database::store::{AdmissionRule, AnalyticsStore, EventStore, RegistrationStore, UpdateRule};
use crate::models::{
    AttendanceCounts, AttendanceSnapshot, CreateEventRequest, Event, EventStatus, LedgerCounts,
    Registration, RegistrationStatus, UpdateEventRequest,
};
use crate::utils::errors::{CampusEventsError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    next_event_id: i64,
    next_registration_id: i64,
    events: BTreeMap<i64, Event>,
    registrations: BTreeMap<i64, Registration>,
    snapshots: BTreeMap<i64, AttendanceSnapshot>,
    failing_transitions: HashSet<i64>,
    failing_snapshots: HashSet<i64>,
}

impl MemoryState {
    fn counts_for(&self, event_id: i64) -> AttendanceCounts {
        self.registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .fold(AttendanceCounts::default(), |mut counts, r| {
                if r.status == RegistrationStatus::Confirmed {
                    counts.confirmed += 1;
                }
                if r.checked_in {
                    counts.checked_in += 1;
                }
                counts
            })
    }
}

/// Shared in-memory backend; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make status transitions of `event_id` fail with an internal error
    pub async fn fail_transitions_for(&self, event_id: i64) {
        self.state.lock().await.failing_transitions.insert(event_id);
    }

    /// Make snapshot writes for `event_id` fail with an internal error
    pub async fn fail_snapshots_for(&self, event_id: i64) {
        self.state.lock().await.failing_snapshots.insert(event_id);
    }

    /// Clear injected failures
    pub async fn heal(&self) {
        let mut state = self.state.lock().await;
        state.failing_transitions.clear();
        state.failing_snapshots.clear();
    }

    /// Number of stored attendance snapshots
    pub async fn snapshot_count(&self) -> usize {
        self.state.lock().await.snapshots.len()
    }

    /// Overwrite a stored event as-is, bypassing every rule
    pub async fn put_event(&self, event: Event) {
        let mut state = self.state.lock().await;
        state.next_event_id = state.next_event_id.max(event.id);
        state.events.insert(event.id, event);
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn insert_event(&self, request: &CreateEventRequest, organizer_id: i64, now: DateTime<Utc>) -> Result<Event> {
        let mut state = self.state.lock().await;
        state.next_event_id += 1;

        let event = Event {
            id: state.next_event_id,
            title: request.title.clone(),
            description: request.description.clone(),
            status: request.initial_status(),
            start_date: request.start_date,
            end_date: request.end_date,
            capacity: request.capacity,
            organizer_id,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        state.events.insert(event.id, event.clone());

        Ok(event)
    }

    async fn find_event(&self, event_id: i64) -> Result<Option<Event>> {
        Ok(self.state.lock().await.events.get(&event_id).cloned())
    }

    async fn list_events(&self, statuses: &[EventStatus]) -> Result<Vec<Event>> {
        let state = self.state.lock().await;
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|e| statuses.is_empty() || statuses.contains(&e.status))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));

        Ok(events)
    }

    async fn update_status_if(&self, event_id: i64, expected: EventStatus, target: EventStatus, now: DateTime<Utc>) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.failing_transitions.contains(&event_id) {
            return Err(CampusEventsError::Internal(format!("injected transition failure for event {}", event_id)));
        }

        match state.events.get_mut(&event_id) {
            Some(event) if event.status == expected => {
                event.status = target;
                event.updated_at = now;
                if target == EventStatus::Completed {
                    event.completed_at = Some(now);
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_details(&self, event_id: i64, changes: &UpdateEventRequest, now: DateTime<Utc>, rule: &UpdateRule) -> Result<Event> {
        let mut state = self.state.lock().await;
        let confirmed = state.counts_for(event_id).confirmed;

        let current = state
            .events
            .get(&event_id)
            .cloned()
            .ok_or(CampusEventsError::EventNotFound { event_id })?;

        let mut updated = changes.merged_with(&current);
        rule(&current, &updated, confirmed)?;

        updated.updated_at = now;
        state.events.insert(event_id, updated.clone());

        Ok(updated)
    }

    async fn delete_event(&self, event_id: i64) -> Result<bool> {
        let mut state = self.state.lock().await;
        let removed = state.events.remove(&event_id).is_some();
        if removed {
            state.registrations.retain(|_, r| r.event_id != event_id);
            state.snapshots.remove(&event_id);
        }

        Ok(removed)
    }
}

#[async_trait]
impl RegistrationStore for InMemoryStore {
    async fn register_if_admitted(
        &self,
        event_id: i64,
        user_id: i64,
        qr_code: &str,
        now: DateTime<Utc>,
        admit: &AdmissionRule,
    ) -> Result<Registration> {
        let mut state = self.state.lock().await;

        let event = state
            .events
            .get(&event_id)
            .cloned()
            .ok_or(CampusEventsError::EventNotFound { event_id })?;

        let counts = LedgerCounts {
            confirmed: state.counts_for(event_id).confirmed,
            user_has_active: state
                .registrations
                .values()
                .any(|r| r.event_id == event_id && r.user_id == user_id && r.is_active()),
        };
        admit(&event, &counts)?;

        if state.registrations.values().any(|r| r.qr_code == qr_code) {
            return Err(CampusEventsError::Internal("duplicate QR code generated".to_string()));
        }

        state.next_registration_id += 1;
        let registration = Registration {
            id: state.next_registration_id,
            event_id,
            user_id,
            status: RegistrationStatus::Confirmed,
            qr_code: qr_code.to_string(),
            checked_in: false,
            checked_in_at: None,
            created_at: now,
        };
        state.registrations.insert(registration.id, registration.clone());

        Ok(registration)
    }

    async fn find_registration(&self, registration_id: i64) -> Result<Option<Registration>> {
        Ok(self.state.lock().await.registrations.get(&registration_id).cloned())
    }

    async fn find_by_qr_code(&self, event_id: i64, qr_code: &str) -> Result<Option<Registration>> {
        Ok(self
            .state
            .lock()
            .await
            .registrations
            .values()
            .find(|r| r.event_id == event_id && r.qr_code == qr_code)
            .cloned())
    }

    async fn cancel_if_confirmed(&self, registration_id: i64) -> Result<bool> {
        let mut state = self.state.lock().await;
        match state.registrations.get_mut(&registration_id) {
            Some(r) if r.status == RegistrationStatus::Confirmed && !r.checked_in => {
                r.status = RegistrationStatus::Cancelled;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_checked_in(&self, registration_id: i64, at: DateTime<Utc>) -> Result<bool> {
        let mut state = self.state.lock().await;
        match state.registrations.get_mut(&registration_id) {
            Some(r) if r.status == RegistrationStatus::Confirmed && !r.checked_in => {
                r.checked_in = true;
                r.checked_in_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_for_event(&self, event_id: i64) -> Result<Vec<Registration>> {
        Ok(self
            .state
            .lock()
            .await
            .registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Registration>> {
        Ok(self
            .state
            .lock()
            .await
            .registrations
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn attendance_counts(&self, event_id: i64) -> Result<AttendanceCounts> {
        Ok(self.state.lock().await.counts_for(event_id))
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryStore {
    async fn apply_snapshot(&self, snapshot: &AttendanceSnapshot) -> Result<AttendanceSnapshot> {
        let mut state = self.state.lock().await;
        if state.failing_snapshots.contains(&snapshot.event_id) {
            return Err(CampusEventsError::Internal(format!(
                "injected snapshot failure for event {}",
                snapshot.event_id
            )));
        }
        if !state.events.contains_key(&snapshot.event_id) {
            return Err(CampusEventsError::EventNotFound { event_id: snapshot.event_id });
        }

        state.snapshots.insert(snapshot.event_id, snapshot.clone());
        Ok(snapshot.clone())
    }

    async fn find_snapshot(&self, event_id: i64) -> Result<Option<AttendanceSnapshot>> {
        Ok(self.state.lock().await.snapshots.get(&event_id).cloned())
    }

    async fn completed_without_snapshot(&self) -> Result<Vec<i64>> {
        let state = self.state.lock().await;
        Ok(state
            .events
            .values()
            .filter(|e| e.status == EventStatus::Completed && !state.snapshots.contains_key(&e.id))
            .map(|e| e.id)
            .collect())
    }
}
