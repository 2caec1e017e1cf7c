//! Event model and status state machine

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;

/// Lifecycle status of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Draft,
    Published,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "DRAFT",
            EventStatus::Published => "PUBLISHED",
            EventStatus::Ongoing => "ONGOING",
            EventStatus::Completed => "COMPLETED",
            EventStatus::Cancelled => "CANCELLED",
        }
    }

    /// COMPLETED and CANCELLED never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Cancelled)
    }

    /// Whether `self -> target` is an edge of the state machine.
    ///
    /// Forward edges only; CANCELLED is reachable from every non-terminal
    /// state. Staying in the same status is not an edge.
    pub fn can_transition_to(&self, target: EventStatus) -> bool {
        use EventStatus::*;

        match (self, target) {
            (Draft, Published) => true,
            (Published, Ongoing) => true,
            (Published, Completed) => true,
            (Ongoing, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub capacity: i32,
    pub organizer_id: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// `start_date <= now < end_date`
    pub fn is_in_progress(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now < self.end_date
    }

    /// The end date has been reached, so the event may be completed
    pub fn is_due_for_completion(&self, now: DateTime<Utc>) -> bool {
        self.end_date <= now
    }

    /// Strictly past the end date; the record is frozen apart from status and analytics
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }

    /// Registration is open while published and before the start date
    pub fn accepts_registrations(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Published && now < self.start_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub capacity: i32,
    /// Create the event as DRAFT instead of PUBLISHED
    #[serde(default)]
    pub draft: bool,
}

impl CreateEventRequest {
    pub fn initial_status(&self) -> EventStatus {
        if self.draft {
            EventStatus::Draft
        } else {
            EventStatus::Published
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
}

impl UpdateEventRequest {
    /// Apply the requested changes on top of `event` without persisting them
    pub fn merged_with(&self, event: &Event) -> Event {
        let mut merged = event.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(description) = &self.description {
            merged.description = Some(description.clone());
        }
        if let Some(start_date) = self.start_date {
            merged.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            merged.end_date = end_date;
        }
        if let Some(capacity) = self.capacity {
            merged.capacity = capacity;
        }
        merged
    }
}

/// Event details shared by creation and update validation
pub fn validate_event_fields(title: &str, start_date: DateTime<Utc>, end_date: DateTime<Utc>, capacity: i32) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Event title is required".to_string());
    }
    if start_date >= end_date {
        return Err("Event start date must be before its end date".to_string());
    }
    if capacity <= 0 {
        return Err("Event capacity must be a positive integer".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use EventStatus::*;

    #[test]
    fn test_forward_transitions() {
        assert!(Draft.can_transition_to(Published));
        assert!(Published.can_transition_to(Ongoing));
        assert!(Published.can_transition_to(Completed));
        assert!(Ongoing.can_transition_to(Completed));
        assert!(!Ongoing.can_transition_to(Published));
        assert!(!Completed.can_transition_to(Ongoing));
        assert!(!Draft.can_transition_to(Ongoing));
        assert!(!Published.can_transition_to(Published));
    }

    #[test]
    fn test_cancellation_only_from_non_terminal() {
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Published.can_transition_to(Cancelled));
        assert!(Ongoing.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_validate_event_fields() {
        let start = Utc::now();
        let end = start + chrono::Duration::hours(2);
        assert!(validate_event_fields("Talk", start, end, 10).is_ok());
        assert!(validate_event_fields("Talk", end, start, 10).is_err());
        assert!(validate_event_fields("Talk", start, start, 10).is_err());
        assert!(validate_event_fields("Talk", start, end, 0).is_err());
        assert!(validate_event_fields("  ", start, end, 10).is_err());
    }
}
