//! Request handlers module
//!
//! Transport-neutral entry points for the request surface. Each handler takes
//! the resolved caller and the request payload and answers with a status code
//! plus a serializable body, or a typed error carrying the status to return.
//! - Event handlers for creation, deletion and completion
//! - Registration handlers for enrollment, cancellation and check-in

pub mod events;
pub mod registrations;

// Re-export commonly used handler functions
pub use events::*;
pub use registrations::*;

use serde::Serialize;
use crate::utils::errors::CampusEventsError;

/// Successful response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(body: T) -> Self {
        Self { status: 200, body }
    }

    pub fn created(body: T) -> Self {
        Self { status: 201, body }
    }
}

/// Error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

impl From<CampusEventsError> for ApiError {
    fn from(error: CampusEventsError) -> Self {
        let message = match error.kind() {
            // Infrastructure details stay in the logs
            crate::utils::errors::ErrorKind::Internal => {
                tracing::error!(error = %error, "Request failed with internal error");
                "Internal error".to_string()
            }
            _ => error.to_string(),
        };

        Self {
            status: error.status_code(),
            code: error.code().to_string(),
            message,
        }
    }
}

pub type HandlerResult<T> = std::result::Result<ApiResponse<T>, ApiError>;

/// Empty body for responses that carry no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Empty {}
