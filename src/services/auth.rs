//! Authorization service implementation
//!
//! Identity is resolved elsewhere; callers hand the engine an [`Actor`] and
//! every mutating boundary asks the configured [`AuthorizationPolicy`] whether
//! the actor may perform the action on the resource. Core rules never branch
//! on roles themselves.

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::models::{Event, Registration};
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::logging::log_access_denied;

/// Coarse role supplied by the identity collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Organizer,
    Admin,
}

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn student(user_id: i64) -> Self {
        Self::new(user_id, Role::Student)
    }

    pub fn organizer(user_id: i64) -> Self {
        Self::new(user_id, Role::Organizer)
    }

    pub fn admin(user_id: i64) -> Self {
        Self::new(user_id, Role::Admin)
    }
}

/// Mutating or privileged operations guarded at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateEvent,
    PublishEvent,
    UpdateEvent,
    CancelEvent,
    CompleteEvent,
    DeleteEvent,
    Register,
    CancelRegistration,
    CheckIn,
    ViewAnalytics,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::CreateEvent => "create_event",
            Action::PublishEvent => "publish_event",
            Action::UpdateEvent => "update_event",
            Action::CancelEvent => "cancel_event",
            Action::CompleteEvent => "complete_event",
            Action::DeleteEvent => "delete_event",
            Action::Register => "register",
            Action::CancelRegistration => "cancel_registration",
            Action::CheckIn => "check_in",
            Action::ViewAnalytics => "view_analytics",
        };
        f.write_str(name)
    }
}

/// What an action targets, reduced to the ownership facts policies need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    System,
    Event { organizer_id: i64 },
    Registration { user_id: i64, organizer_id: i64 },
}

impl Resource {
    pub fn event(event: &Event) -> Self {
        Resource::Event { organizer_id: event.organizer_id }
    }

    pub fn registration(registration: &Registration, event: &Event) -> Self {
        Resource::Registration {
            user_id: registration.user_id,
            organizer_id: event.organizer_id,
        }
    }
}

/// External capability check
pub trait AuthorizationPolicy: Send + Sync {
    fn can_perform(&self, actor: &Actor, action: Action, resource: &Resource) -> bool;
}

/// Default role-based policy
///
/// Admins may do everything. Organizers create events and manage the ones
/// they own. Anyone may register, and registrants may cancel their own
/// registration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl AuthorizationPolicy for RolePolicy {
    fn can_perform(&self, actor: &Actor, action: Action, resource: &Resource) -> bool {
        if actor.role == Role::Admin {
            return true;
        }

        let owns_event = |organizer_id: i64| actor.role == Role::Organizer && actor.user_id == organizer_id;

        match (action, resource) {
            (Action::CreateEvent, _) => actor.role == Role::Organizer,
            (Action::Register, Resource::Event { .. }) => true,
            (Action::CancelRegistration, Resource::Registration { user_id, organizer_id }) => {
                actor.user_id == *user_id || owns_event(*organizer_id)
            }
            (
                Action::PublishEvent
                | Action::UpdateEvent
                | Action::CancelEvent
                | Action::CompleteEvent
                | Action::DeleteEvent
                | Action::CheckIn
                | Action::ViewAnalytics,
                Resource::Event { organizer_id },
            ) => owns_event(*organizer_id),
            _ => false,
        }
    }
}

/// Authorization service wrapping the configured policy
#[derive(Clone)]
pub struct AuthService {
    policy: Arc<dyn AuthorizationPolicy>,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(policy: Arc<dyn AuthorizationPolicy>) -> Self {
        Self { policy }
    }

    pub fn can_perform(&self, actor: &Actor, action: Action, resource: &Resource) -> bool {
        self.policy.can_perform(actor, action, resource)
    }

    /// Fail with `PermissionDenied` unless the policy allows the action
    pub fn authorize(&self, actor: &Actor, action: Action, resource: &Resource) -> Result<()> {
        if self.can_perform(actor, action, resource) {
            debug!(user_id = actor.user_id, action = %action, "Authorization granted");
            Ok(())
        } else {
            let details = format!("{:?}", resource);
            log_access_denied(actor.user_id, &action.to_string(), Some(&details));
            Err(CampusEventsError::PermissionDenied(format!(
                "{:?} {} may not {}",
                actor.role, actor.user_id, action
            )))
        }
    }
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new(Arc::new(RolePolicy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNED: Resource = Resource::Event { organizer_id: 10 };

    #[test]
    fn test_admin_can_do_everything() {
        let admin = Actor::admin(1);
        assert!(RolePolicy.can_perform(&admin, Action::DeleteEvent, &OWNED));
        assert!(RolePolicy.can_perform(&admin, Action::CompleteEvent, &OWNED));
        assert!(RolePolicy.can_perform(&admin, Action::CreateEvent, &Resource::System));
    }

    #[test]
    fn test_organizer_manages_only_own_events() {
        let owner = Actor::organizer(10);
        let other = Actor::organizer(11);
        assert!(RolePolicy.can_perform(&owner, Action::CompleteEvent, &OWNED));
        assert!(RolePolicy.can_perform(&owner, Action::CheckIn, &OWNED));
        assert!(!RolePolicy.can_perform(&other, Action::CompleteEvent, &OWNED));
        assert!(RolePolicy.can_perform(&other, Action::CreateEvent, &Resource::System));
    }

    #[test]
    fn test_students() {
        let student = Actor::student(20);
        assert!(RolePolicy.can_perform(&student, Action::Register, &OWNED));
        assert!(!RolePolicy.can_perform(&student, Action::CreateEvent, &Resource::System));
        assert!(!RolePolicy.can_perform(&student, Action::CompleteEvent, &OWNED));

        let own = Resource::Registration { user_id: 20, organizer_id: 10 };
        let foreign = Resource::Registration { user_id: 21, organizer_id: 10 };
        assert!(RolePolicy.can_perform(&student, Action::CancelRegistration, &own));
        assert!(!RolePolicy.can_perform(&student, Action::CancelRegistration, &foreign));
        assert!(RolePolicy.can_perform(&Actor::organizer(10), Action::CancelRegistration, &foreign));
    }

    #[test]
    fn test_authorize_returns_permission_denied() {
        let auth = AuthService::default();
        let result = auth.authorize(&Actor::student(20), Action::DeleteEvent, &OWNED);
        assert!(matches!(result, Err(CampusEventsError::PermissionDenied(_))));
    }
}
