//! Lifecycle scheduler
//!
//! Time-driven status transitions. A sweep observes each candidate event and
//! applies at most one guarded transition keyed on the observed status, so
//! overlapping sweeps and manual completions converge without double effects.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use serde::Serialize;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;
use crate::database::DatabaseService;
use crate::models::{AttendanceSnapshot, Event, EventStatus};
use crate::services::analytics::AnalyticsAggregator;
use crate::services::auth::{Action, Actor, AuthService, Resource};
use crate::services::events::EventService;
use crate::services::notification::NotificationService;
use crate::utils::clock::Clock;
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::logging::{log_background_error, log_event_action, log_status_transition, log_sweep};

/// One event the sweep could not process
#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
    pub event_id: i64,
    pub error: String,
    /// Whether the next sweep is expected to succeed without intervention
    pub recoverable: bool,
}

/// Outcome of one sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Events moved PUBLISHED -> ONGOING by this sweep
    pub started_events: Vec<i64>,
    /// Events moved to COMPLETED by this sweep
    pub completed_events: Vec<i64>,
    /// COMPLETED events whose missing snapshot was rebuilt
    pub analytics_retried: Vec<i64>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    fn fail(&mut self, task: &str, event_id: i64, error: CampusEventsError) {
        log_background_error(task, &error, Some(event_id));
        self.failures.push(SweepFailure {
            event_id,
            error: error.to_string(),
            recoverable: error.is_recoverable(),
        });
    }
}

/// Result of the manual completion path
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResult {
    pub event: Event,
    pub analytics: Option<AttendanceSnapshot>,
}

#[derive(Clone)]
pub struct LifecycleScheduler {
    db: DatabaseService,
    events: EventService,
    analytics: AnalyticsAggregator,
    auth: AuthService,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
}

impl LifecycleScheduler {
    pub fn new(
        db: DatabaseService,
        events: EventService,
        analytics: AnalyticsAggregator,
        auth: AuthService,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { db, events, analytics, auth, notifications, clock }
    }

    /// Apply every time-based transition that is due.
    ///
    /// Errors are collected per event; only a failure to list candidates
    /// aborts the sweep.
    pub async fn sweep(&self) -> Result<SweepReport> {
        let span = tracing::info_span!("lifecycle_sweep", sweep_id = %Uuid::new_v4());
        self.sweep_inner().instrument(span).await
    }

    async fn sweep_inner(&self) -> Result<SweepReport> {
        let now = self.clock.now();
        let mut report = SweepReport::default();
        let mut attempted_analytics = HashSet::new();

        let candidates = self
            .db
            .events
            .list_events(&[EventStatus::Published, EventStatus::Ongoing])
            .await?;
        debug!(candidates = candidates.len(), "Sweep candidates loaded");

        for event in candidates {
            let target = if event.is_due_for_completion(now) {
                EventStatus::Completed
            } else if event.status == EventStatus::Published && event.is_in_progress(now) {
                EventStatus::Ongoing
            } else {
                continue;
            };

            let applied = match self.db.events.update_status_if(event.id, event.status, target, now).await {
                Ok(applied) => applied,
                Err(e) => {
                    report.fail("status_transition", event.id, e);
                    continue;
                }
            };
            log_status_transition(event.id, event.status.as_str(), target.as_str(), applied);
            if !applied {
                continue;
            }

            if target == EventStatus::Ongoing {
                report.started_events.push(event.id);
                continue;
            }

            report.completed_events.push(event.id);
            attempted_analytics.insert(event.id);
            let snapshot = match self.analytics.recompute(event.id).await {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    report.fail("analytics_recompute", event.id, e);
                    None
                }
            };
            self.notify_completed(event.id, snapshot.as_ref()).await;
        }

        match self.db.analytics.completed_without_snapshot().await {
            Ok(missing) => {
                for event_id in missing {
                    if !attempted_analytics.insert(event_id) {
                        continue;
                    }
                    match self.analytics.recompute(event_id).await {
                        Ok(_) => report.analytics_retried.push(event_id),
                        Err(e) => report.fail("analytics_retry", event_id, e),
                    }
                }
            }
            Err(e) => {
                log_background_error("analytics_retry_scan", &e, None);
            }
        }

        log_sweep(
            report.started_events.len(),
            report.completed_events.len(),
            report.analytics_retried.len(),
            report.failures.len(),
        );
        Ok(report)
    }

    /// Manually complete an event whose end date has been reached.
    ///
    /// Completing an already COMPLETED event only recomputes its analytics.
    pub async fn complete_event(&self, actor: &Actor, event_id: i64) -> Result<CompletionResult> {
        let event = self.events.get_event(event_id).await?;
        self.auth.authorize(actor, Action::CompleteEvent, &Resource::event(&event))?;

        match event.status {
            EventStatus::Completed => {}
            EventStatus::Draft | EventStatus::Cancelled => {
                return Err(CampusEventsError::InvalidTransition {
                    from: event.status.to_string(),
                    to: EventStatus::Completed.to_string(),
                });
            }
            EventStatus::Published | EventStatus::Ongoing => {
                if !event.is_due_for_completion(self.clock.now()) {
                    return Err(CampusEventsError::EventNotEnded { event_id });
                }
            }
        }

        let (event, applied) = self.events.apply_transition(event_id, EventStatus::Completed).await?;
        let analytics = match self.analytics.recompute(event_id).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log_background_error("analytics_recompute", &e, Some(event_id));
                None
            }
        };

        if applied {
            log_event_action(event_id, "complete", actor.user_id, None);
            self.notifications.event_completed(&event, analytics.as_ref()).await;
        }

        Ok(CompletionResult { event, analytics })
    }

    /// Sweep every `interval` until `shutdown` resolves
    pub async fn run<F>(&self, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(interval_seconds = interval.as_secs(), "Lifecycle scheduler started");
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Lifecycle scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        warn!(error = %e, "Lifecycle sweep aborted, retrying next tick");
                    }
                }
            }
        }
    }

    async fn notify_completed(&self, event_id: i64, snapshot: Option<&AttendanceSnapshot>) {
        match self.events.get_event(event_id).await {
            Ok(event) => self.notifications.event_completed(&event, snapshot).await,
            Err(e) => log_background_error("completion_notification", &e, Some(event_id)),
        }
    }
}
