//! Event permissions

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A capability granted on one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Edit event details, change status, manage the team
    ManageEvent,
    /// Decide on applications
    ScreenAttendees,
    /// See the event dashboard and team
    ViewDashboard,
    /// Check attendees in at the door
    CheckIn,
    /// Flag attendees and write door notes
    FlagAttendees,
}

/// Ordered set of permissions
pub type PermissionSet = BTreeSet<Permission>;

impl Permission {
    /// Every permission the system knows about
    pub const ALL: [Permission; 5] = [
        Self::ManageEvent,
        Self::ScreenAttendees,
        Self::ViewDashboard,
        Self::CheckIn,
        Self::FlagAttendees,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageEvent => "manage_event",
            Self::ScreenAttendees => "screen_attendees",
            Self::ViewDashboard => "view_dashboard",
            Self::CheckIn => "check_in",
            Self::FlagAttendees => "flag_attendees",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    /// The full set, held by event creators
    pub fn all() -> PermissionSet {
        Self::ALL.into_iter().collect()
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
