//! CampusEvents lifecycle engine
//!
//! Core of a campus event registration product: drives event status forward
//! through time, enforces the capacity ceiling under concurrent registration,
//! classifies check-ins against the event window and derives attendance
//! analytics that stay consistent however often the triggers run.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{CampusEventsError, Result};

// Re-export main components for easy access
pub use database::{DatabaseService, InMemoryStore};
pub use services::ServiceFactory;
pub use utils::clock::{Clock, ManualClock, SystemClock};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
