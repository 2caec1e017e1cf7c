//! Test data helpers for creating test objects
//!
//! Fixed instants and event requests shared by the integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use CampusEvents::models::{CreateEventRequest, Event, EventStatus};

pub const ORGANIZER_ID: i64 = 100;
pub const OTHER_ORGANIZER_ID: i64 = 101;
pub const ADMIN_ID: i64 = 1;

/// Reference "now" used by every test context
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap()
}

/// Event request starting `starts_in` after the reference time and lasting `duration`
pub fn event_request(title: &str, starts_in: Duration, duration: Duration, capacity: i32) -> CreateEventRequest {
    let start_date = base_time() + starts_in;
    CreateEventRequest {
        title: title.to_string(),
        description: Some(format!("{} description", title)),
        start_date,
        end_date: start_date + duration,
        capacity,
        draft: false,
    }
}

/// Published two-hour event tomorrow
pub fn upcoming_event_request(capacity: i32) -> CreateEventRequest {
    event_request("Robotics Club Demo Day", Duration::days(1), Duration::hours(2), capacity)
}

/// Event stored directly, bypassing creation rules (for past or odd states)
pub fn stored_event(id: i64, status: EventStatus, start_date: DateTime<Utc>, end_date: DateTime<Utc>, capacity: i32) -> Event {
    let created = start_date - Duration::days(14);
    Event {
        id,
        title: format!("Stored event {}", id),
        description: None,
        status,
        start_date,
        end_date,
        capacity,
        organizer_id: ORGANIZER_ID,
        completed_at: None,
        created_at: created,
        updated_at: created,
    }
}
