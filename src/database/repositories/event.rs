//! Event repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use crate::database::store::{EventStore, UpdateRule};
use crate::models::event::{CreateEventRequest, Event, EventStatus, UpdateEventRequest};
use crate::utils::errors::{CampusEventsError, Result};

pub(crate) const EVENT_COLUMNS: &str =
    "id, title, description, status, start_date, end_date, capacity, organizer_id, completed_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for EventRepository {
    /// Create a new event
    async fn insert_event(&self, request: &CreateEventRequest, organizer_id: i64, now: DateTime<Utc>) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, status, start_date, end_date, capacity, organizer_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.initial_status())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.capacity)
        .bind(organizer_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    async fn find_event(&self, event_id: i64) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// List events, optionally restricted to a set of statuses
    async fn list_events(&self, statuses: &[EventStatus]) -> Result<Vec<Event>> {
        let events = if statuses.is_empty() {
            sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY start_date ASC, id ASC"))
                .fetch_all(&self.pool)
                .await?
        } else {
            let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
            sqlx::query_as::<_, Event>(&format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE status::text = ANY($1) ORDER BY start_date ASC, id ASC"
            ))
            .bind(statuses)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(events)
    }

    /// Conditionally move an event to a new status
    async fn update_status_if(&self, event_id: i64, expected: EventStatus, target: EventStatus, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET status = $3,
                updated_at = $4,
                completed_at = CASE WHEN $3 = 'COMPLETED'::event_status THEN $4 ELSE completed_at END
            WHERE id = $1 AND status = $2
            "#
        )
        .bind(event_id)
        .bind(expected)
        .bind(target)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Update event details under a row lock
    async fn update_details(&self, event_id: i64, changes: &UpdateEventRequest, now: DateTime<Utc>, rule: &UpdateRule) -> Result<Event> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"))
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CampusEventsError::EventNotFound { event_id })?;

        let confirmed: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = 'CONFIRMED'"
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        let updated = changes.merged_with(&current);
        rule(&current, &updated, confirmed.0)?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                start_date = $4,
                end_date = $5,
                capacity = $6,
                updated_at = $7
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(&updated.title)
        .bind(&updated.description)
        .bind(updated.start_date)
        .bind(updated.end_date)
        .bind(updated.capacity)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(event)
    }

    /// Delete event (registrations and analytics cascade)
    async fn delete_event(&self, event_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
