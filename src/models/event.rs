//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Live,
    Ended,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Live => "live",
            Self::Ended => "ended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "live" => Some(Self::Live),
            "ended" => Some(Self::Ended),
            _ => None,
        }
    }

    /// Organizer-driven transitions. Unpublishing is only possible before the event goes live.
    pub fn can_transition_to(&self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Published)
                | (Self::Published, Self::Draft)
                | (Self::Published, Self::Live)
                | (Self::Live, Self::Ended)
        )
    }

    /// Whether attendees may submit applications
    pub fn accepts_applications(&self) -> bool {
        matches!(self, Self::Published | Self::Live)
    }

    /// Whether the event shows up in public listings
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Published | Self::Live)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location_name: String,
    /// Revealed only to approved attendees and the event team
    pub location_address: String,
    pub capacity: i32,
    pub guest_passes_per_attendee: i32,
    pub genres: Vec<String>,
    pub status: EventStatus,
    pub created_by: String,
    pub screening_required: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_creator(&self, user_email: &str) -> bool {
        self.created_by == user_email
    }
}

/// Fields for creating an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location_name: String,
    pub location_address: String,
    pub capacity: i32,
    pub guest_passes_per_attendee: i32,
    pub genres: Vec<String>,
    pub status: EventStatus,
    pub created_by: String,
    pub screening_required: bool,
}

/// Partial event update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub capacity: Option<i32>,
    pub guest_passes_per_attendee: Option<i32>,
    pub genres: Option<Vec<String>>,
    pub status: Option<EventStatus>,
    pub screening_required: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(EventStatus::Draft.can_transition_to(EventStatus::Published));
        assert!(EventStatus::Published.can_transition_to(EventStatus::Draft));
        assert!(EventStatus::Published.can_transition_to(EventStatus::Live));
        assert!(EventStatus::Live.can_transition_to(EventStatus::Ended));

        assert!(!EventStatus::Draft.can_transition_to(EventStatus::Live));
        assert!(!EventStatus::Live.can_transition_to(EventStatus::Published));
        assert!(!EventStatus::Ended.can_transition_to(EventStatus::Live));
        assert!(!EventStatus::Ended.can_transition_to(EventStatus::Ended));
    }

    #[test]
    fn test_only_public_events_accept_applications() {
        assert!(!EventStatus::Draft.accepts_applications());
        assert!(EventStatus::Published.accepts_applications());
        assert!(EventStatus::Live.accepts_applications());
        assert!(!EventStatus::Ended.accepts_applications());
    }
}
