//! Registration ledger implementation
//!
//! Capacity-safe and uniqueness-safe enrollment. The admission rule below is
//! evaluated by the store while the event is locked, so the capacity check and
//! the insert form one atomic unit.

use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::debug;
use crate::database::DatabaseService;
use crate::models::{Event, LedgerCounts, Registration, RegistrationStatus};
use crate::services::auth::{Action, Actor, AuthService, Resource};
use crate::services::notification::NotificationService;
use crate::utils::clock::Clock;
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::helpers::generate_qr_code;
use crate::utils::logging::{log_registration, log_registration_rejected};

/// Decide whether `user_id` may take a seat in `event` given the locked ledger state.
///
/// A live duplicate is reported before the window or capacity so a repeated
/// request always answers `AlreadyRegistered`.
pub fn admission_check(event: &Event, counts: &LedgerCounts, user_id: i64, now: DateTime<Utc>) -> Result<()> {
    if counts.user_has_active {
        return Err(CampusEventsError::AlreadyRegistered { event_id: event.id, user_id });
    }
    if !event.accepts_registrations(now) {
        return Err(CampusEventsError::RegistrationClosed { event_id: event.id });
    }
    if counts.confirmed >= event.capacity as i64 {
        return Err(CampusEventsError::EventFull { event_id: event.id });
    }
    Ok(())
}

#[derive(Clone)]
pub struct RegistrationLedger {
    db: DatabaseService,
    auth: AuthService,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
    qr_code_length: usize,
}

impl RegistrationLedger {
    pub fn new(
        db: DatabaseService,
        auth: AuthService,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
        qr_code_length: usize,
    ) -> Self {
        Self { db, auth, notifications, clock, qr_code_length }
    }

    /// Register the actor for an event
    pub async fn register(&self, actor: &Actor, event_id: i64) -> Result<Registration> {
        let event = self
            .db
            .events
            .find_event(event_id)
            .await?
            .ok_or(CampusEventsError::EventNotFound { event_id })?;
        self.auth.authorize(actor, Action::Register, &Resource::event(&event))?;

        let user_id = actor.user_id;
        let now = self.clock.now();
        let qr_code = generate_qr_code(self.qr_code_length);
        let admit = move |event: &Event, counts: &LedgerCounts| admission_check(event, counts, user_id, now);

        match self
            .db
            .registrations
            .register_if_admitted(event_id, user_id, &qr_code, now, &admit)
            .await
        {
            Ok(registration) => {
                log_registration(event_id, user_id, registration.id, "register");
                self.notifications.registration_confirmed(&event, &registration).await;
                Ok(registration)
            }
            Err(e) => {
                log_registration_rejected(event_id, user_id, e.code());
                Err(e)
            }
        }
    }

    /// Cancel a registration before the event starts, freeing its seat
    pub async fn cancel(&self, actor: &Actor, registration_id: i64) -> Result<Registration> {
        let registration = self.get_registration(registration_id).await?;
        let event_id = registration.event_id;
        let event = self
            .db
            .events
            .find_event(event_id)
            .await?
            .ok_or(CampusEventsError::EventNotFound { event_id })?;
        self.auth.authorize(actor, Action::CancelRegistration, &Resource::registration(&registration, &event))?;

        if registration.status == RegistrationStatus::Cancelled {
            debug!(registration_id = registration_id, "Registration already cancelled");
            return Ok(registration);
        }
        if self.clock.now() >= event.start_date {
            return Err(CampusEventsError::Conflict(format!(
                "Registration {} can only be cancelled before event {} starts",
                registration_id, event_id
            )));
        }
        if registration.checked_in {
            return Err(CampusEventsError::Conflict(format!(
                "Registration {} is already checked in",
                registration_id
            )));
        }

        let applied = self.db.registrations.cancel_if_confirmed(registration_id).await?;
        let current = self.get_registration(registration_id).await?;

        if applied {
            log_registration(event_id, current.user_id, registration_id, "cancel");
            self.notifications.registration_cancelled(&event, &current).await;
        } else if current.status != RegistrationStatus::Cancelled {
            return Err(CampusEventsError::Conflict(format!(
                "Registration {} was checked in concurrently",
                registration_id
            )));
        }

        Ok(current)
    }

    pub async fn get_registration(&self, registration_id: i64) -> Result<Registration> {
        self.db
            .registrations
            .find_registration(registration_id)
            .await?
            .ok_or_else(|| CampusEventsError::RegistrationNotFound(format!("id {}", registration_id)))
    }

    /// All registrations of an event, cancelled ones included
    pub async fn event_registrations(&self, event_id: i64) -> Result<Vec<Registration>> {
        self.db.registrations.list_for_event(event_id).await
    }

    pub async fn user_registrations(&self, user_id: i64) -> Result<Vec<Registration>> {
        self.db.registrations.list_for_user(user_id).await
    }

    /// Capacity left for new registrations
    pub async fn seats_remaining(&self, event_id: i64) -> Result<i64> {
        let event = self
            .db
            .events
            .find_event(event_id)
            .await?
            .ok_or(CampusEventsError::EventNotFound { event_id })?;
        let counts = self.db.registrations.attendance_counts(event_id).await?;

        Ok((event.capacity as i64 - counts.confirmed).max(0))
    }
}
