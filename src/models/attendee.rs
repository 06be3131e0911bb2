//! Attendee (door record) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::application::ApplicationStatus;

/// A note left on an attendee by door staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendeeNote {
    pub by: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Check-in stamp
#[derive(Debug, Clone, PartialEq)]
pub struct CheckIn {
    pub at: DateTime<Utc>,
    pub by: String,
}

/// Door record for an approved application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: Uuid,
    pub event_id: Uuid,
    pub application_id: Uuid,
    pub user_email: String,
    pub status: ApplicationStatus,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_in_by: Option<String>,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    /// Append-only, oldest first
    pub notes: Vec<AttendeeNote>,
    pub guests_brought: i32,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating an attendee
#[derive(Debug, Clone)]
pub struct NewAttendee {
    pub event_id: Uuid,
    pub application_id: Uuid,
    pub user_email: String,
    pub guests_brought: i32,
}

/// Door-side update of an attendee
#[derive(Debug, Clone, Default)]
pub struct AttendeeChanges {
    pub check_in: Option<CheckIn>,
    pub flag_reason: Option<String>,
    pub append_note: Option<AttendeeNote>,
}
