//! Notification service implementation
//!
//! This service renders domain notifications from per-kind templates and hands
//! them to the external delivery collaborator. Delivery failures are logged and
//! counted; they never fail the operation that produced the notification.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn, debug};
use crate::config::settings::NotificationConfig;
use crate::models::{AttendanceSnapshot, CheckInClassification, DomainNotification, Event, NotificationKind, Registration};
use crate::utils::errors::Result;
use crate::utils::helpers::{format_timestamp, render_template};

/// Delivery collaborator (email, push, ...)
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: &DomainNotification) -> Result<()>;
}

/// Dispatcher that writes notifications to the log
#[derive(Debug, Clone)]
pub struct LogDispatcher {
    sender: String,
}

impl LogDispatcher {
    pub fn new(sender: impl Into<String>) -> Self {
        Self { sender: sender.into() }
    }
}

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, notification: &DomainNotification) -> Result<()> {
        info!(
            sender = %self.sender,
            event_id = notification.event_id,
            user_id = notification.user_id,
            kind = %notification.kind,
            message = %notification.message,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Dispatcher that keeps every notification in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    sent: Arc<Mutex<Vec<DomainNotification>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<DomainNotification> {
        self.sent.lock().await.clone()
    }

    pub async fn count_of(&self, kind: NotificationKind) -> usize {
        self.sent.lock().await.iter().filter(|n| n.kind == kind).count()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notification: &DomainNotification) -> Result<()> {
        self.sent.lock().await.push(notification.clone());
        Ok(())
    }
}

/// Notification statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total_sent: u64,
    pub total_failed: u64,
    pub sent_by_kind: HashMap<String, u64>,
}

/// Notification service for domain events
#[derive(Clone)]
pub struct NotificationService {
    dispatcher: Arc<dyn NotificationDispatcher>,
    templates: Arc<HashMap<NotificationKind, String>>,
    stats: Arc<Mutex<NotificationStats>>,
    enabled: bool,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>, config: &NotificationConfig) -> Self {
        Self {
            dispatcher,
            templates: Arc::new(Self::load_default_templates()),
            stats: Arc::new(Mutex::new(NotificationStats::default())),
            enabled: config.enabled,
        }
    }

    /// Render the template for `kind`
    pub fn format_message(&self, kind: NotificationKind, parameters: &[(&str, String)]) -> String {
        match self.templates.get(&kind) {
            Some(template) => render_template(template, parameters),
            None => kind.to_string(),
        }
    }

    /// Render and dispatch one notification
    pub async fn notify(&self, kind: NotificationKind, event_id: i64, user_id: i64, parameters: &[(&str, String)]) {
        if !self.enabled {
            debug!(event_id = event_id, kind = %kind, "Notifications disabled, skipping");
            return;
        }

        let notification = DomainNotification {
            event_id,
            user_id,
            kind,
            message: self.format_message(kind, parameters),
        };

        let outcome = self.dispatcher.dispatch(&notification).await;
        let mut stats = self.stats.lock().await;
        match outcome {
            Ok(()) => {
                stats.total_sent += 1;
                *stats.sent_by_kind.entry(kind.to_string()).or_insert(0) += 1;
            }
            Err(e) => {
                stats.total_failed += 1;
                warn!(event_id = event_id, user_id = user_id, kind = %kind, error = %e, "Failed to dispatch notification");
            }
        }
    }

    pub async fn registration_confirmed(&self, event: &Event, registration: &Registration) {
        let parameters = [
            ("title", event.title.clone()),
            ("start", format_timestamp(event.start_date)),
            ("qr_code", registration.qr_code.clone()),
        ];
        self.notify(NotificationKind::RegistrationConfirmed, event.id, registration.user_id, &parameters).await;
    }

    pub async fn registration_cancelled(&self, event: &Event, registration: &Registration) {
        let parameters = [("title", event.title.clone())];
        self.notify(NotificationKind::RegistrationCancelled, event.id, registration.user_id, &parameters).await;
    }

    pub async fn checked_in(&self, event: &Event, registration: &Registration, classification: CheckInClassification) {
        let parameters = [
            ("title", event.title.clone()),
            ("classification", classification.to_string()),
        ];
        self.notify(NotificationKind::CheckedIn, event.id, registration.user_id, &parameters).await;
    }

    /// Completion notice for the organizer
    pub async fn event_completed(&self, event: &Event, snapshot: Option<&AttendanceSnapshot>) {
        let summary = match snapshot {
            Some(s) => format!("{} of {} attended ({:.2}%)", s.total_attendees, s.total_registrations, s.attendance_rate),
            None => "attendance analytics pending".to_string(),
        };
        let parameters = [("title", event.title.clone()), ("summary", summary)];
        self.notify(NotificationKind::EventCompleted, event.id, event.organizer_id, &parameters).await;
    }

    /// Cancellation notice for every confirmed registrant
    pub async fn event_cancelled(&self, event: &Event, user_ids: &[i64]) {
        let parameters = [("title", event.title.clone())];
        let sends = user_ids
            .iter()
            .map(|user_id| self.notify(NotificationKind::EventCancelled, event.id, *user_id, &parameters));
        join_all(sends).await;
    }

    /// Get notification statistics
    pub async fn get_stats(&self) -> NotificationStats {
        self.stats.lock().await.clone()
    }

    fn load_default_templates() -> HashMap<NotificationKind, String> {
        let mut templates = HashMap::new();

        templates.insert(
            NotificationKind::RegistrationConfirmed,
            "You are registered for {title} starting {start}. Your check-in code is {qr_code}.".to_string(),
        );
        templates.insert(
            NotificationKind::RegistrationCancelled,
            "Your registration for {title} has been cancelled.".to_string(),
        );
        templates.insert(
            NotificationKind::CheckedIn,
            "Checked in to {title} ({classification}).".to_string(),
        );
        templates.insert(
            NotificationKind::EventCompleted,
            "{title} has completed: {summary}.".to_string(),
        );
        templates.insert(
            NotificationKind::EventCancelled,
            "{title} has been cancelled by the organizer.".to_string(),
        );

        templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::CampusEventsError;

    struct FailingDispatcher;

    #[async_trait]
    impl NotificationDispatcher for FailingDispatcher {
        async fn dispatch(&self, _notification: &DomainNotification) -> Result<()> {
            Err(CampusEventsError::Internal("smtp down".to_string()))
        }
    }

    fn config(enabled: bool) -> NotificationConfig {
        NotificationConfig { enabled, sender: "test".to_string() }
    }

    #[tokio::test]
    async fn test_notify_renders_template() {
        let recorder = RecordingDispatcher::new();
        let service = NotificationService::new(Arc::new(recorder.clone()), &config(true));

        service.notify(NotificationKind::CheckedIn, 3, 4, &[("title", "Hackathon".to_string()), ("classification", "EARLY".to_string())]).await;

        let sent = recorder.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message, "Checked in to Hackathon (EARLY).");
        assert_eq!(service.get_stats().await.total_sent, 1);
    }

    #[tokio::test]
    async fn test_dispatch_failures_are_counted_not_raised() {
        let service = NotificationService::new(Arc::new(FailingDispatcher), &config(true));
        service.notify(NotificationKind::EventCancelled, 1, 2, &[]).await;

        let stats = service.get_stats().await;
        assert_eq!(stats.total_failed, 1);
        assert_eq!(stats.total_sent, 0);
    }

    #[tokio::test]
    async fn test_disabled_notifications_are_skipped() {
        let recorder = RecordingDispatcher::new();
        let service = NotificationService::new(Arc::new(recorder.clone()), &config(false));
        service.notify(NotificationKind::EventCancelled, 1, 2, &[]).await;
        assert!(recorder.sent().await.is_empty());
    }
}
