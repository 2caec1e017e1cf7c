//! Attendance analytics repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use crate::database::store::AnalyticsStore;
use crate::models::analytics::AttendanceSnapshot;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsStore for AnalyticsRepository {
    /// Upsert the snapshot keyed by event
    async fn apply_snapshot(&self, snapshot: &AttendanceSnapshot) -> Result<AttendanceSnapshot> {
        let stored = sqlx::query_as::<_, AttendanceSnapshot>(
            r#"
            INSERT INTO event_analytics (event_id, total_registrations, total_attendees, attendance_rate, completed_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (event_id) DO UPDATE
            SET total_registrations = EXCLUDED.total_registrations,
                total_attendees = EXCLUDED.total_attendees,
                attendance_rate = EXCLUDED.attendance_rate,
                completed_at = EXCLUDED.completed_at
            RETURNING event_id, total_registrations, total_attendees, attendance_rate, completed_at
            "#
        )
        .bind(snapshot.event_id)
        .bind(snapshot.total_registrations)
        .bind(snapshot.total_attendees)
        .bind(snapshot.attendance_rate)
        .bind(snapshot.completed_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn find_snapshot(&self, event_id: i64) -> Result<Option<AttendanceSnapshot>> {
        let snapshot = sqlx::query_as::<_, AttendanceSnapshot>(
            "SELECT event_id, total_registrations, total_attendees, attendance_rate, completed_at FROM event_analytics WHERE event_id = $1"
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(snapshot)
    }

    async fn completed_without_snapshot(&self) -> Result<Vec<i64>> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT e.id
            FROM events e
            LEFT JOIN event_analytics a ON a.event_id = e.id
            WHERE e.status = 'COMPLETED' AND a.event_id IS NULL
            ORDER BY e.id ASC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
