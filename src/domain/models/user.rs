use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub assigned_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String, role: Role, assigned_event_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            role: role.to_string(),
            assigned_event_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
    /// Read-only viewer scoped to one event.
    Senior,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
            Role::Senior => "Senior",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "User" => Ok(Role::User),
            "Senior" => Ok(Role::Senior),
            other => Err(AppError::Validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// The identity a request acts as. Handed explicitly to every service call.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Option<String>,
    pub username: String,
    pub role: Option<Role>,
    pub assigned_event_id: Option<String>,
}

impl Actor {
    pub fn authenticated(user_id: String, username: String, role: Role, assigned_event_id: Option<String>) -> Self {
        Self { user_id: Some(user_id), username, role: Some(role), assigned_event_id }
    }

    /// Unauthenticated caller holding a ticket capability.
    pub fn system() -> Self {
        Self { user_id: None, username: "System".to_string(), role: None, assigned_event_id: None }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.role, Some(Role::Admin) | Some(Role::User))
    }

    pub fn ensure_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin role required".into()))
        }
    }

    /// Admin or door staff.
    pub fn ensure_staff(&self) -> Result<(), AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin or User role required".into()))
        }
    }

    /// Staff see every event; Senior-role viewers only their assigned one.
    pub fn ensure_event_access(&self, event_id: &str) -> Result<(), AppError> {
        if self.is_staff() {
            return Ok(());
        }
        match (self.role, self.assigned_event_id.as_deref()) {
            (Some(Role::Senior), Some(assigned)) if assigned == event_id => Ok(()),
            _ => Err(AppError::Forbidden("You do not have access to this event".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn senior_viewer(event: &str) -> Actor {
        Actor::authenticated("u1".into(), "viewer".into(), Role::Senior, Some(event.into()))
    }

    #[test]
    fn test_role_round_trip_and_rejects_unknown() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Senior.to_string(), "Senior");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_senior_viewer_scoped_to_assigned_event() {
        let viewer = senior_viewer("ev-1");
        assert!(viewer.ensure_event_access("ev-1").is_ok());
        assert!(matches!(viewer.ensure_event_access("ev-2"), Err(AppError::Forbidden(_))));
        assert!(viewer.ensure_staff().is_err());
    }

    #[test]
    fn test_door_user_is_staff_but_not_admin() {
        let door = Actor::authenticated("u2".into(), "door".into(), Role::User, None);
        assert!(door.ensure_staff().is_ok());
        assert!(door.ensure_event_access("anything").is_ok());
        assert!(door.ensure_admin().is_err());
    }

    #[test]
    fn test_system_actor_has_no_role() {
        let system = Actor::system();
        assert_eq!(system.username, "System");
        assert!(system.ensure_staff().is_err());
        assert!(system.ensure_event_access("ev-1").is_err());
    }
}
