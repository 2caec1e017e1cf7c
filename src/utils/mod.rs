//! Utility modules
//!
//! This module contains common utilities used throughout the engine,
//! including error handling, logging setup, the time source and helper functions.

pub mod clock;
pub mod errors;
pub mod logging;
pub mod helpers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{CampusEventsError, Result};
