//! Event request handlers

use serde::Serialize;
use tracing::debug;
use crate::handlers::{ApiResponse, Empty, HandlerResult};
use crate::models::{AttendanceSnapshot, CreateEventRequest, Event};
use crate::services::{Actor, ServiceFactory};

/// Body of `POST /events/{id}/complete`
#[derive(Debug, Clone, Serialize)]
pub struct CompleteEventBody {
    pub event: Event,
    pub analytics: Option<AttendanceSnapshot>,
}

/// Body of `POST /events/auto-complete`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCompleteBody {
    pub started_events: usize,
    pub completed_events: usize,
}

/// `POST /events`
pub async fn create_event(services: &ServiceFactory, actor: &Actor, request: CreateEventRequest) -> HandlerResult<Event> {
    debug!(user_id = actor.user_id, title = %request.title, "Handling create event");
    let event = services.events.create_event(actor, request).await?;
    Ok(ApiResponse::created(event))
}

/// `DELETE /events/{id}`
pub async fn delete_event(services: &ServiceFactory, actor: &Actor, event_id: i64) -> HandlerResult<Empty> {
    debug!(user_id = actor.user_id, event_id = event_id, "Handling delete event");
    services.events.delete_event(actor, event_id).await?;
    Ok(ApiResponse::ok(Empty {}))
}

/// `POST /events/{id}/complete`
pub async fn complete_event(services: &ServiceFactory, actor: &Actor, event_id: i64) -> HandlerResult<CompleteEventBody> {
    debug!(user_id = actor.user_id, event_id = event_id, "Handling complete event");
    let result = services.scheduler.complete_event(actor, event_id).await?;
    Ok(ApiResponse::ok(CompleteEventBody {
        event: result.event,
        analytics: result.analytics,
    }))
}

/// `POST /events/auto-complete`
///
/// Runs one sweep on demand. Per-event failures are logged by the sweep and
/// do not fail the request.
pub async fn auto_complete(services: &ServiceFactory) -> HandlerResult<AutoCompleteBody> {
    let report = services.scheduler.sweep().await?;
    Ok(ApiResponse::ok(AutoCompleteBody {
        started_events: report.started_events.len(),
        completed_events: report.completed_events.len(),
    }))
}
