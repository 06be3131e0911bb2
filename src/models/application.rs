//! Event application model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Application status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Denied,
    Waitlisted,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Waitlisted => "waitlisted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            "waitlisted" => Some(Self::Waitlisted),
            _ => None,
        }
    }

    /// Approved and denied applications never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Denied)
    }

    /// Whether a reviewer has stamped this status
    pub fn is_reviewed(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome an organizer can record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Deny,
    Waitlist,
}

impl Decision {
    pub fn target_status(&self) -> ApplicationStatus {
        match self {
            Self::Approve => ApplicationStatus::Approved,
            Self::Deny => ApplicationStatus::Denied,
            Self::Waitlist => ApplicationStatus::Waitlisted,
        }
    }
}

/// Review stamp written together with a decided status
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub status: ApplicationStatus,
    pub reviewed_by: String,
    pub reviewed_at: DateTime<Utc>,
}

/// An attendee's request to join an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventApplication {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_email: String,
    pub application_message: String,
    pub guests_requested: i32,
    pub status: ApplicationStatus,
    pub verified: bool,
    /// Handle of the last issued verification code, never the code itself
    #[serde(skip_serializing)]
    pub verification_code_id: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating an application
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub event_id: Uuid,
    pub user_email: String,
    pub application_message: String,
    pub guests_requested: i32,
}

/// Verification-side update of an application
#[derive(Debug, Clone, Default)]
pub struct ApplicationChanges {
    pub verified: Option<bool>,
    pub verification_code_id: Option<String>,
}
