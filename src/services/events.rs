//! Event service implementation
//!
//! Authoritative event records and the status state machine. Every status
//! change goes through a guarded update keyed on the status the caller last
//! observed, so racing writers cannot apply the same transition twice.

use std::sync::Arc;
use tracing::debug;
use crate::database::DatabaseService;
use crate::models::event::validate_event_fields;
use crate::models::{CreateEventRequest, Event, EventStatus, RegistrationStatus, UpdateEventRequest};
use crate::services::analytics::AnalyticsAggregator;
use crate::services::auth::{Action, Actor, AuthService, Resource};
use crate::services::notification::NotificationService;
use crate::utils::clock::Clock;
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::logging::{log_background_error, log_event_action, log_status_transition};

/// Re-reads allowed when a guarded transition loses a race
const MAX_TRANSITION_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct EventService {
    db: DatabaseService,
    auth: AuthService,
    analytics: AnalyticsAggregator,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(
        db: DatabaseService,
        auth: AuthService,
        analytics: AnalyticsAggregator,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { db, auth, analytics, notifications, clock }
    }

    /// Create a new event in PUBLISHED (or DRAFT) status
    pub async fn create_event(&self, actor: &Actor, request: CreateEventRequest) -> Result<Event> {
        self.auth.authorize(actor, Action::CreateEvent, &Resource::System)?;
        validate_event_fields(&request.title, request.start_date, request.end_date, request.capacity)
            .map_err(CampusEventsError::Validation)?;

        let event = self.db.events.insert_event(&request, actor.user_id, self.clock.now()).await?;
        log_event_action(event.id, "create", actor.user_id, Some(event.status.as_str()));

        Ok(event)
    }

    pub async fn get_event(&self, event_id: i64) -> Result<Event> {
        self.db
            .events
            .find_event(event_id)
            .await?
            .ok_or(CampusEventsError::EventNotFound { event_id })
    }

    /// Events in any of `statuses` (all when empty)
    pub async fn list_events(&self, statuses: &[EventStatus]) -> Result<Vec<Event>> {
        self.db.events.list_events(statuses).await
    }

    /// Move an event to `target` if the state machine allows it.
    ///
    /// Requesting the status the event already has succeeds without writing.
    /// A COMPLETED transition applied here also refreshes the attendance
    /// snapshot and sends the completion notice.
    pub async fn transition_status(&self, event_id: i64, target: EventStatus) -> Result<Event> {
        let (event, applied) = self.apply_transition(event_id, target).await?;

        if applied && target == EventStatus::Completed {
            let snapshot = match self.analytics.recompute(event_id).await {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    log_background_error("analytics_recompute", &e, Some(event_id));
                    None
                }
            };
            self.notifications.event_completed(&event, snapshot.as_ref()).await;
        }

        Ok(event)
    }

    /// Like [`transition_status`](Self::transition_status) without the
    /// completion side effects, reporting whether this call performed the write.
    ///
    /// ONGOING is only reachable while the event is running and COMPLETED
    /// only once its end date has been reached.
    pub async fn apply_transition(&self, event_id: i64, target: EventStatus) -> Result<(Event, bool)> {
        for _ in 0..MAX_TRANSITION_ATTEMPTS {
            let event = self.get_event(event_id).await?;
            let now = self.clock.now();

            if event.status == target {
                debug!(event_id = event_id, status = %target, "Event already in requested status");
                return Ok((event, false));
            }
            if !event.status.can_transition_to(target) {
                return Err(CampusEventsError::InvalidTransition {
                    from: event.status.to_string(),
                    to: target.to_string(),
                });
            }
            match target {
                EventStatus::Ongoing if !event.is_in_progress(now) => {
                    return Err(CampusEventsError::InvalidTransition {
                        from: event.status.to_string(),
                        to: target.to_string(),
                    });
                }
                EventStatus::Completed if !event.is_due_for_completion(now) => {
                    return Err(CampusEventsError::EventNotEnded { event_id });
                }
                _ => {}
            }

            let applied = self
                .db
                .events
                .update_status_if(event_id, event.status, target, now)
                .await?;
            log_status_transition(event_id, event.status.as_str(), target.as_str(), applied);

            if applied {
                return Ok((self.get_event(event_id).await?, true));
            }
        }

        Err(CampusEventsError::Conflict(format!(
            "Event {} changed status concurrently, retry the request",
            event_id
        )))
    }

    /// DRAFT -> PUBLISHED
    pub async fn publish_event(&self, actor: &Actor, event_id: i64) -> Result<Event> {
        let event = self.get_event(event_id).await?;
        self.auth.authorize(actor, Action::PublishEvent, &Resource::event(&event))?;

        let event = self.transition_status(event_id, EventStatus::Published).await?;
        log_event_action(event_id, "publish", actor.user_id, None);
        Ok(event)
    }

    /// Any non-terminal status -> CANCELLED; confirmed registrants are notified once
    pub async fn cancel_event(&self, actor: &Actor, event_id: i64) -> Result<Event> {
        let event = self.get_event(event_id).await?;
        self.auth.authorize(actor, Action::CancelEvent, &Resource::event(&event))?;

        let (event, applied) = self.apply_transition(event_id, EventStatus::Cancelled).await?;
        if applied {
            log_event_action(event_id, "cancel", actor.user_id, None);

            let user_ids: Vec<i64> = self
                .db
                .registrations
                .list_for_event(event_id)
                .await?
                .into_iter()
                .filter(|r| r.status == RegistrationStatus::Confirmed)
                .map(|r| r.user_id)
                .collect();
            self.notifications.event_cancelled(&event, &user_ids).await;
        }

        Ok(event)
    }

    /// Edit event details until the event has ended
    pub async fn update_event(&self, actor: &Actor, event_id: i64, changes: UpdateEventRequest) -> Result<Event> {
        let event = self.get_event(event_id).await?;
        self.auth.authorize(actor, Action::UpdateEvent, &Resource::event(&event))?;

        let now = self.clock.now();
        let rule = move |current: &Event, updated: &Event, confirmed: i64| -> Result<()> {
            if current.has_ended(now) {
                return Err(CampusEventsError::PastEventImmutable { event_id: current.id });
            }
            if current.status.is_terminal() {
                return Err(CampusEventsError::Conflict(format!(
                    "Event {} is {} and can no longer be edited",
                    current.id, current.status
                )));
            }
            validate_event_fields(&updated.title, updated.start_date, updated.end_date, updated.capacity)
                .map_err(CampusEventsError::Validation)?;
            if (updated.capacity as i64) < confirmed {
                return Err(CampusEventsError::Conflict(format!(
                    "Capacity {} is below the {} confirmed registrations",
                    updated.capacity, confirmed
                )));
            }
            Ok(())
        };

        let event = self.db.events.update_details(event_id, &changes, now, &rule).await?;
        log_event_action(event_id, "update", actor.user_id, None);

        Ok(event)
    }

    /// Delete an event that has not ended yet.
    ///
    /// Past and completed events are kept for analytics whatever the caller's role.
    pub async fn delete_event(&self, actor: &Actor, event_id: i64) -> Result<()> {
        let event = self.get_event(event_id).await?;
        self.auth.authorize(actor, Action::DeleteEvent, &Resource::event(&event))?;

        if event.status == EventStatus::Completed || event.has_ended(self.clock.now()) {
            return Err(CampusEventsError::PastEventImmutable { event_id });
        }

        if !self.db.events.delete_event(event_id).await? {
            return Err(CampusEventsError::EventNotFound { event_id });
        }
        log_event_action(event_id, "delete", actor.user_id, None);

        Ok(())
    }
}
