//! Database service layer
//!
//! Bundles the three stores behind shared trait objects so services do not
//! care which backend they run on.

use std::sync::Arc;
use crate::database::memory::InMemoryStore;
use crate::database::repositories::{AnalyticsRepository, EventRepository, RegistrationRepository};
use crate::database::store::{AnalyticsStore, EventStore, RegistrationStore};
use crate::database::DatabasePool;

#[derive(Clone)]
pub struct DatabaseService {
    pub events: Arc<dyn EventStore>,
    pub registrations: Arc<dyn RegistrationStore>,
    pub analytics: Arc<dyn AnalyticsStore>,
}

impl DatabaseService {
    /// PostgreSQL-backed stores sharing one pool
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: Arc::new(EventRepository::new(pool.clone())),
            registrations: Arc::new(RegistrationRepository::new(pool.clone())),
            analytics: Arc::new(AnalyticsRepository::new(pool)),
        }
    }

    /// Stores backed by one shared in-memory state
    pub fn in_memory(store: InMemoryStore) -> Self {
        Self {
            events: Arc::new(store.clone()),
            registrations: Arc::new(store.clone()),
            analytics: Arc::new(store),
        }
    }
}

impl std::fmt::Debug for DatabaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseService").finish_non_exhaustive()
    }
}
