//! Domain notifications emitted by the engine

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RegistrationConfirmed,
    RegistrationCancelled,
    CheckedIn,
    EventCompleted,
    EventCancelled,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::RegistrationConfirmed => "registration_confirmed",
            NotificationKind::RegistrationCancelled => "registration_cancelled",
            NotificationKind::CheckedIn => "checked_in",
            NotificationKind::EventCompleted => "event_completed",
            NotificationKind::EventCancelled => "event_cancelled",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message handed to the external delivery collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainNotification {
    pub event_id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub message: String,
}
