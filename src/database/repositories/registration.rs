//! Registration repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use crate::database::repositories::event::EVENT_COLUMNS;
use crate::database::store::{AdmissionRule, RegistrationStore};
use crate::models::analytics::AttendanceCounts;
use crate::models::event::Event;
use crate::models::registration::{LedgerCounts, Registration};
use crate::utils::errors::{CampusEventsError, Result};

const REGISTRATION_COLUMNS: &str =
    "id, event_id, user_id, status, qr_code, checked_in, checked_in_at, created_at";

/// Partial unique index guarding one live registration per user and event
const ACTIVE_USER_INDEX: &str = "registrations_active_user_idx";

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationStore for RegistrationRepository {
    /// Capacity-safe registration.
    ///
    /// The event row stays locked from the count until commit, so concurrent
    /// registrations for the same event are admitted one at a time.
    async fn register_if_admitted(
        &self,
        event_id: i64,
        user_id: i64,
        qr_code: &str,
        now: DateTime<Utc>,
        admit: &AdmissionRule,
    ) -> Result<Registration> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"))
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CampusEventsError::EventNotFound { event_id })?;

        let (confirmed, user_has_active): (i64, Option<bool>) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'CONFIRMED'),
                   BOOL_OR(user_id = $2 AND status <> 'CANCELLED')
            FROM registrations
            WHERE event_id = $1
            "#
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        admit(&event, &LedgerCounts {
            confirmed,
            user_has_active: user_has_active.unwrap_or(false),
        })?;

        let inserted = sqlx::query_as::<_, Registration>(&format!(
            r#"
            INSERT INTO registrations (event_id, user_id, status, qr_code, checked_in, created_at)
            VALUES ($1, $2, 'CONFIRMED', $3, FALSE, $4)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(qr_code)
        .bind(now)
        .fetch_one(&mut *tx)
        .await;

        let registration = match inserted {
            Ok(registration) => registration,
            Err(sqlx::Error::Database(db)) if db.constraint() == Some(ACTIVE_USER_INDEX) => {
                return Err(CampusEventsError::AlreadyRegistered { event_id, user_id });
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        Ok(registration)
    }

    async fn find_registration(&self, registration_id: i64) -> Result<Option<Registration>> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(registration_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    async fn find_by_qr_code(&self, event_id: i64, qr_code: &str) -> Result<Option<Registration>> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = $1 AND qr_code = $2"
        ))
        .bind(event_id)
        .bind(qr_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    async fn cancel_if_confirmed(&self, registration_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET status = 'CANCELLED'
            WHERE id = $1 AND status = 'CONFIRMED' AND checked_in = FALSE
            "#
        )
        .bind(registration_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_checked_in(&self, registration_id: i64, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET checked_in = TRUE, checked_in_at = $2
            WHERE id = $1 AND checked_in = FALSE AND status = 'CONFIRMED'
            "#
        )
        .bind(registration_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_for_event(&self, event_id: i64) -> Result<Vec<Registration>> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Registration>> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    async fn attendance_counts(&self, event_id: i64) -> Result<AttendanceCounts> {
        let (confirmed, checked_in): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'CONFIRMED'),
                   COUNT(*) FILTER (WHERE checked_in)
            FROM registrations
            WHERE event_id = $1
            "#
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AttendanceCounts { confirmed, checked_in })
    }
}
