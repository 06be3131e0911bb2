//! Event team roles and the role history log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::{Permission, PermissionSet};

/// Role a team member holds on one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Full event management rights
    Organizer,
    /// Door operations: check-in and flagging
    Bouncer,
    /// Read-only dashboard access
    Performer,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organizer => "organizer",
            Self::Bouncer => "bouncer",
            Self::Performer => "performer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "organizer" => Some(Self::Organizer),
            "bouncer" => Some(Self::Bouncer),
            "performer" => Some(Self::Performer),
            _ => None,
        }
    }

    /// Canonical permission table. Stored permission lists are only a cache of this.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Self::Organizer => &[
                Permission::ManageEvent,
                Permission::ScreenAttendees,
                Permission::ViewDashboard,
                Permission::CheckIn,
                Permission::FlagAttendees,
            ],
            Self::Bouncer => &[
                Permission::CheckIn,
                Permission::FlagAttendees,
                Permission::ViewDashboard,
            ],
            Self::Performer => &[Permission::ViewDashboard],
        }
    }

    pub fn permission_set(&self) -> PermissionSet {
        self.permissions().iter().copied().collect()
    }
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An active role assignment, projected from the role history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRole {
    /// Id of the `Assign` entry that created this assignment
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_email: String,
    pub role: TeamRole,
    /// Permissions recorded at assignment time
    pub permissions: Vec<Permission>,
    pub assigned_by: String,
    pub assigned_at: DateTime<Utc>,
}

/// Kind of entry in the role history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleAction {
    Assign,
    Revoke,
}

impl RoleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Revoke => "revoke",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "assign" => Some(Self::Assign),
            "revoke" => Some(Self::Revoke),
            _ => None,
        }
    }
}

/// One append-only entry of the role history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleChange {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_email: String,
    pub action: RoleAction,
    /// Role granted (assign) or taken away (revoke)
    pub role: TeamRole,
    pub permissions: Vec<Permission>,
    pub actor: String,
    pub recorded_at: DateTime<Utc>,
}

/// Fields for appending a history entry
#[derive(Debug, Clone)]
pub struct NewRoleChange {
    pub event_id: Uuid,
    pub user_email: String,
    pub action: RoleAction,
    pub role: TeamRole,
    pub actor: String,
}

impl NewRoleChange {
    /// Permissions to record alongside the entry
    pub fn permissions(&self) -> Vec<Permission> {
        match self.action {
            RoleAction::Assign => self.role.permissions().to_vec(),
            RoleAction::Revoke => Vec::new(),
        }
    }
}
