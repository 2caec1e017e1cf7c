//! Check-in classifier
//!
//! Records attendance and labels its timing. Early and late scans are
//! accepted; the label is the only consequence.

use std::sync::Arc;
use tracing::debug;
use crate::database::DatabaseService;
use crate::models::{CheckInClassification, CheckInOutcome, Event, EventStatus, Registration, RegistrationStatus};
use crate::services::analytics::AnalyticsAggregator;
use crate::services::auth::{Action, Actor, AuthService, Resource};
use crate::services::notification::NotificationService;
use crate::utils::clock::Clock;
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::logging::{log_background_error, log_check_in};

#[derive(Clone)]
pub struct CheckInClassifier {
    db: DatabaseService,
    auth: AuthService,
    analytics: AnalyticsAggregator,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
}

impl CheckInClassifier {
    pub fn new(
        db: DatabaseService,
        auth: AuthService,
        analytics: AnalyticsAggregator,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { db, auth, analytics, notifications, clock }
    }

    /// Check in on behalf of a scanning actor (event organizer or admin)
    pub async fn check_in_as(&self, actor: &Actor, event_id: i64, qr_code: &str) -> Result<CheckInOutcome> {
        let event = self.load_event(event_id).await?;
        self.auth.authorize(actor, Action::CheckIn, &Resource::event(&event))?;
        self.classify_and_record(&event, qr_code).await
    }

    /// Record attendance for the registration holding `qr_code`
    pub async fn check_in(&self, event_id: i64, qr_code: &str) -> Result<CheckInOutcome> {
        let event = self.load_event(event_id).await?;
        self.classify_and_record(&event, qr_code).await
    }

    async fn classify_and_record(&self, event: &Event, qr_code: &str) -> Result<CheckInOutcome> {
        let registration = self
            .db
            .registrations
            .find_by_qr_code(event.id, qr_code)
            .await?
            .filter(|r| r.status == RegistrationStatus::Confirmed)
            .ok_or_else(|| not_found(event.id))?;

        if registration.checked_in {
            return Ok(already(registration));
        }

        let now = self.clock.now();
        let classification = CheckInClassification::for_window(now, event.start_date, event.end_date);

        if self.db.registrations.mark_checked_in(registration.id, now).await? {
            let registration = Registration {
                checked_in: true,
                checked_in_at: Some(now),
                ..registration
            };
            log_check_in(event.id, registration.id, classification.as_str());
            self.notifications.checked_in(event, &registration, classification).await;
            self.refresh_completed_snapshot(event.id).await;

            return Ok(CheckInOutcome { registration, classification });
        }

        // Lost the race to another scan, or the registration was cancelled meanwhile
        let current = self
            .db
            .registrations
            .find_registration(registration.id)
            .await?
            .ok_or_else(|| not_found(event.id))?;
        if current.checked_in {
            debug!(event_id = event.id, registration_id = current.id, "Concurrent scan already checked in");
            Ok(already(current))
        } else {
            Err(not_found(event.id))
        }
    }

    /// A check-in landing after completion must still reach the snapshot.
    /// The event is re-read after the write so a completion racing this scan
    /// is either seen here or recomputes after it.
    async fn refresh_completed_snapshot(&self, event_id: i64) {
        match self.load_event(event_id).await {
            Ok(event) if event.status == EventStatus::Completed => {
                if let Err(e) = self.analytics.recompute(event_id).await {
                    log_background_error("analytics_recompute", &e, Some(event_id));
                }
            }
            Ok(_) => {}
            Err(e) => log_background_error("analytics_recompute", &e, Some(event_id)),
        }
    }

    async fn load_event(&self, event_id: i64) -> Result<Event> {
        self.db
            .events
            .find_event(event_id)
            .await?
            .ok_or(CampusEventsError::EventNotFound { event_id })
    }
}

fn already(registration: Registration) -> CheckInOutcome {
    CheckInOutcome {
        registration,
        classification: CheckInClassification::Already,
    }
}

fn not_found(event_id: i64) -> CampusEventsError {
    CampusEventsError::RegistrationNotFound(format!("no active registration for this code at event {}", event_id))
}
