//! Test context for unified test setup
//!
//! Wires the full service graph onto the in-memory store with a manual clock
//! and a recording notification dispatcher.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use CampusEvents::config::{Settings, StorageBackend};
use CampusEvents::database::{DatabaseService, InMemoryStore};
use CampusEvents::models::{CreateEventRequest, Event, Registration};
use CampusEvents::services::{Actor, RecordingDispatcher, ServiceFactory};
use CampusEvents::utils::clock::ManualClock;

use super::test_data::{base_time, ADMIN_ID, ORGANIZER_ID};

/// Unified test context that manages all test components
pub struct TestContext {
    pub store: InMemoryStore,
    pub clock: ManualClock,
    pub dispatcher: RecordingDispatcher,
    pub settings: Settings,
    pub services: ServiceFactory,
}

impl TestContext {
    /// Create a new test context at the reference time
    pub fn new() -> Self {
        Self::at(base_time())
    }

    /// Create a new test context with the clock set to `now`
    pub fn at(now: DateTime<Utc>) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let mut settings = Settings::default();
        settings.storage.backend = StorageBackend::Memory;

        let store = InMemoryStore::new();
        let clock = ManualClock::new(now);
        let dispatcher = RecordingDispatcher::new();
        let services = ServiceFactory::new(
            &settings,
            DatabaseService::in_memory(store.clone()),
            Arc::new(dispatcher.clone()),
            Arc::new(clock.clone()),
        );

        Self {
            store,
            clock,
            dispatcher,
            settings,
            services,
        }
    }

    pub fn organizer(&self) -> Actor {
        Actor::organizer(ORGANIZER_ID)
    }

    pub fn admin(&self) -> Actor {
        Actor::admin(ADMIN_ID)
    }

    pub fn student(&self, user_id: i64) -> Actor {
        Actor::student(user_id)
    }

    /// Create an event as the default organizer
    pub async fn create_event(&self, request: CreateEventRequest) -> Event {
        self.services
            .events
            .create_event(&self.organizer(), request)
            .await
            .expect("Failed to create event")
    }

    /// Register `user_id` for `event_id` as a student
    pub async fn register(&self, event_id: i64, user_id: i64) -> Registration {
        self.services
            .registrations
            .register(&self.student(user_id), event_id)
            .await
            .expect("Failed to register")
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn set_time(&self, now: DateTime<Utc>) {
        self.clock.set(now);
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
