//! Event service integration tests

mod helpers;

use assert_matches::assert_matches;
use chrono::Duration;
use helpers::*;
use CampusEvents::models::{EventStatus, NotificationKind, UpdateEventRequest};
use CampusEvents::services::Actor;
use CampusEvents::utils::errors::ErrorKind;
use CampusEvents::CampusEventsError;

#[tokio::test]
async fn test_create_event_defaults_to_published() {
    let ctx = TestContext::new();
    let event = ctx.create_event(upcoming_event_request(25)).await;

    assert_eq!(event.status, EventStatus::Published);
    assert_eq!(event.organizer_id, ORGANIZER_ID);
    assert_eq!(event.capacity, 25);
    assert!(event.completed_at.is_none());
}

#[tokio::test]
async fn test_create_event_validation_and_permission() {
    let ctx = TestContext::new();

    let mut invalid = upcoming_event_request(10);
    invalid.end_date = invalid.start_date;
    let result = ctx.services.events.create_event(&ctx.organizer(), invalid).await;
    assert_matches!(result, Err(CampusEventsError::Validation(_)));

    let result = ctx.services.events.create_event(&ctx.organizer(), upcoming_event_request(0)).await;
    assert_matches!(result, Err(CampusEventsError::Validation(_)));

    let result = ctx.services.events.create_event(&ctx.student(5), upcoming_event_request(10)).await;
    assert_matches!(result, Err(CampusEventsError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_status_never_moves_backward() {
    let ctx = TestContext::new();
    let event = ctx.create_event(upcoming_event_request(10)).await;
    ctx.set_time(event.start_date);
    ctx.services.scheduler.sweep().await.unwrap();

    let result = ctx.services.events.transition_status(event.id, EventStatus::Published).await;
    assert_matches!(result, Err(CampusEventsError::InvalidTransition { .. }));

    let result = ctx.services.events.transition_status(event.id, EventStatus::Draft).await;
    assert_matches!(result, Err(CampusEventsError::InvalidTransition { .. }));

    // Same status is a no-op
    let same = ctx.services.events.transition_status(event.id, EventStatus::Ongoing).await.unwrap();
    assert_eq!(same.status, EventStatus::Ongoing);
}

#[tokio::test]
async fn test_publish_requires_draft_owner() {
    let ctx = TestContext::new();
    let mut request = upcoming_event_request(10);
    request.draft = true;
    let event = ctx.create_event(request).await;

    let other = ctx.services.events.publish_event(&Actor::organizer(OTHER_ORGANIZER_ID), event.id).await;
    assert_matches!(other, Err(CampusEventsError::PermissionDenied(_)));

    let published = ctx.services.events.publish_event(&ctx.organizer(), event.id).await.unwrap();
    assert_eq!(published.status, EventStatus::Published);

    let listed = ctx.services.events.list_events(&[EventStatus::Published]).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(ctx.services.events.list_events(&[EventStatus::Draft]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_event_notifies_confirmed_registrants() {
    let ctx = TestContext::new();
    let event = ctx.create_event(upcoming_event_request(10)).await;
    ctx.register(event.id, 1).await;
    ctx.register(event.id, 2).await;
    let leaving = ctx.register(event.id, 3).await;
    ctx.services.registrations.cancel(&ctx.student(3), leaving.id).await.unwrap();

    let cancelled = ctx.services.events.cancel_event(&ctx.organizer(), event.id).await.unwrap();
    assert_eq!(cancelled.status, EventStatus::Cancelled);
    assert_eq!(ctx.dispatcher.count_of(NotificationKind::EventCancelled).await, 2);

    // Cancelling twice applies nothing new
    ctx.services.events.cancel_event(&ctx.organizer(), event.id).await.unwrap();
    assert_eq!(ctx.dispatcher.count_of(NotificationKind::EventCancelled).await, 2);

    let result = ctx.services.registrations.register(&ctx.student(9), event.id).await;
    assert_matches!(result, Err(CampusEventsError::RegistrationClosed { .. }));
}

#[tokio::test]
async fn test_completed_event_cannot_be_cancelled() {
    let ctx = TestContext::new();
    let event = ctx.create_event(upcoming_event_request(10)).await;
    ctx.set_time(event.end_date);
    ctx.services.scheduler.sweep().await.unwrap();

    let result = ctx.services.events.cancel_event(&ctx.admin(), event.id).await;
    assert_matches!(result, Err(CampusEventsError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_update_event_rules() {
    let ctx = TestContext::new();
    let event = ctx.create_event(upcoming_event_request(3)).await;
    ctx.register(event.id, 1).await;
    ctx.register(event.id, 2).await;

    let shrink = UpdateEventRequest {
        capacity: Some(1),
        ..Default::default()
    };
    let result = ctx.services.events.update_event(&ctx.organizer(), event.id, shrink).await;
    assert_matches!(result, Err(CampusEventsError::Conflict(_)));

    let rename = UpdateEventRequest {
        title: Some("Robotics Finals".to_string()),
        capacity: Some(2),
        ..Default::default()
    };
    let updated = ctx.services.events.update_event(&ctx.organizer(), event.id, rename).await.unwrap();
    assert_eq!(updated.title, "Robotics Finals");
    assert_eq!(updated.capacity, 2);

    let inverted = UpdateEventRequest {
        end_date: Some(event.start_date - Duration::hours(1)),
        ..Default::default()
    };
    let result = ctx.services.events.update_event(&ctx.organizer(), event.id, inverted).await;
    assert_matches!(result, Err(CampusEventsError::Validation(_)));

    ctx.set_time(event.end_date + Duration::seconds(1));
    let late = UpdateEventRequest {
        title: Some("Too late".to_string()),
        ..Default::default()
    };
    let result = ctx.services.events.update_event(&ctx.admin(), event.id, late).await;
    assert_matches!(result, Err(CampusEventsError::PastEventImmutable { .. }));
}

#[tokio::test]
async fn test_delete_past_event_is_conflict_even_for_admin() {
    let ctx = TestContext::new();
    let event = ctx.create_event(upcoming_event_request(10)).await;

    ctx.set_time(event.end_date + Duration::minutes(1));
    let result = ctx.services.events.delete_event(&ctx.admin(), event.id).await;

    let error = result.unwrap_err();
    assert_matches!(error, CampusEventsError::PastEventImmutable { .. });
    assert_eq!(error.kind(), ErrorKind::Conflict);
    assert!(ctx.services.events.get_event(event.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_upcoming_event() {
    let ctx = TestContext::new();
    let event = ctx.create_event(upcoming_event_request(10)).await;
    ctx.register(event.id, 1).await;

    let stranger = ctx.services.events.delete_event(&ctx.student(1), event.id).await;
    assert_matches!(stranger, Err(CampusEventsError::PermissionDenied(_)));

    ctx.services.events.delete_event(&ctx.organizer(), event.id).await.unwrap();
    assert_matches!(
        ctx.services.events.get_event(event.id).await,
        Err(CampusEventsError::EventNotFound { .. })
    );
    assert!(ctx.services.registrations.user_registrations(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transition_status_respects_event_window() {
    let ctx = TestContext::new();
    let event = ctx.create_event(upcoming_event_request(10)).await;
    ctx.register(event.id, 1).await;

    let early_start = ctx.services.events.transition_status(event.id, EventStatus::Ongoing).await;
    assert_matches!(early_start, Err(CampusEventsError::InvalidTransition { .. }));

    let early_finish = ctx.services.events.transition_status(event.id, EventStatus::Completed).await;
    assert_matches!(early_finish, Err(CampusEventsError::EventNotEnded { .. }));

    let unchanged = ctx.services.events.get_event(event.id).await.unwrap();
    assert_eq!(unchanged.status, EventStatus::Published);
    assert!(unchanged.completed_at.is_none());

    ctx.set_time(event.start_date + Duration::minutes(5));
    let started = ctx.services.events.transition_status(event.id, EventStatus::Ongoing).await.unwrap();
    assert_eq!(started.status, EventStatus::Ongoing);

    ctx.set_time(event.end_date);
    let completed = ctx.services.events.transition_status(event.id, EventStatus::Completed).await.unwrap();
    assert_eq!(completed.status, EventStatus::Completed);
    assert_eq!(completed.completed_at, Some(event.end_date));

    let snapshot = ctx.services.analytics.get_snapshot(event.id).await.unwrap().unwrap();
    assert_eq!(snapshot.total_registrations, 1);
    assert_eq!(ctx.dispatcher.count_of(NotificationKind::EventCompleted).await, 1);
}

#[tokio::test]
async fn test_ongoing_is_unreachable_after_end() {
    let ctx = TestContext::new();
    let event = ctx.create_event(upcoming_event_request(10)).await;

    ctx.set_time(event.end_date);
    let result = ctx.services.events.transition_status(event.id, EventStatus::Ongoing).await;
    assert_matches!(result, Err(CampusEventsError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_completed_event_cannot_be_deleted_at_its_end() {
    let ctx = TestContext::new();
    let event = ctx.create_event(upcoming_event_request(10)).await;
    ctx.register(event.id, 1).await;

    ctx.set_time(event.end_date);
    ctx.services.scheduler.sweep().await.unwrap();

    let result = ctx.services.events.delete_event(&ctx.admin(), event.id).await;
    assert_matches!(result, Err(CampusEventsError::PastEventImmutable { .. }));
    assert!(ctx.services.analytics.get_snapshot(event.id).await.unwrap().is_some());
    assert_eq!(ctx.services.registrations.user_registrations(1).await.unwrap().len(), 1);
}
