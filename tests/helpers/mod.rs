//! Test helpers module
//!
//! This module provides utilities for testing the CampusEvents engine.
//! It includes the in-memory test context, fixtures and the PostgreSQL helper.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_context;
pub mod test_data;

pub use database_helper::*;
pub use test_context::*;
pub use test_data::*;
