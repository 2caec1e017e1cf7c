//! Services module
//!
//! This module contains the lifecycle and attendance business logic

pub mod analytics;
pub mod auth;
pub mod checkin;
pub mod events;
pub mod notification;
pub mod registration;
pub mod scheduler;

// Re-export commonly used services
pub use analytics::AnalyticsAggregator;
pub use auth::{Action, Actor, AuthService, AuthorizationPolicy, Resource, Role, RolePolicy};
pub use checkin::CheckInClassifier;
pub use events::EventService;
pub use notification::{LogDispatcher, NotificationDispatcher, NotificationService, NotificationStats, RecordingDispatcher};
pub use registration::{admission_check, RegistrationLedger};
pub use scheduler::{CompletionResult, LifecycleScheduler, SweepFailure, SweepReport};

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::clock::Clock;

/// Service factory wiring every service to one store, clock and dispatcher
#[derive(Clone)]
pub struct ServiceFactory {
    pub events: EventService,
    pub registrations: RegistrationLedger,
    pub check_in: CheckInClassifier,
    pub analytics: AnalyticsAggregator,
    pub scheduler: LifecycleScheduler,
    pub auth: AuthService,
    pub notifications: NotificationService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory using the role-based authorization policy
    pub fn new(
        settings: &Settings,
        db: DatabaseService,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_policy(settings, db, dispatcher, clock, Arc::new(RolePolicy))
    }

    /// Create a ServiceFactory with a custom authorization policy
    pub fn with_policy(
        settings: &Settings,
        db: DatabaseService,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        policy: Arc<dyn AuthorizationPolicy>,
    ) -> Self {
        let auth = AuthService::new(policy);
        let notifications = NotificationService::new(dispatcher, &settings.notifications);

        let analytics = AnalyticsAggregator::new(db.clone(), auth.clone());
        let events = EventService::new(
            db.clone(),
            auth.clone(),
            analytics.clone(),
            notifications.clone(),
            clock.clone(),
        );
        let registrations = RegistrationLedger::new(
            db.clone(),
            auth.clone(),
            notifications.clone(),
            clock.clone(),
            settings.registration.qr_code_length,
        );
        let check_in = CheckInClassifier::new(
            db.clone(),
            auth.clone(),
            analytics.clone(),
            notifications.clone(),
            clock.clone(),
        );
        let scheduler = LifecycleScheduler::new(
            db,
            events.clone(),
            analytics.clone(),
            auth.clone(),
            notifications.clone(),
            clock,
        );

        Self {
            events,
            registrations,
            check_in,
            analytics,
            scheduler,
            auth,
            notifications,
        }
    }
}
