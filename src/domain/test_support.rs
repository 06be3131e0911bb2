//! Record fixtures shared by unit tests

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::models::{
    ApplicationStatus, Attendee, Event, EventApplication, EventStatus, RoleAction, RoleChange,
    TeamRole,
};

/// A published event with room for 50
pub fn event_by(creator: &str) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::new_v4(),
        name: "Warehouse 12".to_string(),
        description: Some("All night".to_string()),
        date: now + Duration::days(7),
        location_name: "Dock Street".to_string(),
        location_address: "12 Dock Street, Unit 4".to_string(),
        capacity: 50,
        guest_passes_per_attendee: 1,
        genres: vec!["techno".to_string()],
        status: EventStatus::Published,
        created_by: creator.to_string(),
        screening_required: true,
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

/// A verified application; reviewed statuses carry a review stamp
pub fn application_for(event: &Event, email: &str, status: ApplicationStatus) -> EventApplication {
    let now = Utc::now();
    let reviewed = status.is_reviewed();
    EventApplication {
        id: Uuid::new_v4(),
        event_id: event.id,
        user_email: email.to_string(),
        application_message: "Been coming for years".to_string(),
        guests_requested: 0,
        status,
        verified: true,
        verification_code_id: None,
        reviewed_by: reviewed.then(|| event.created_by.clone()),
        reviewed_at: reviewed.then_some(now),
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

/// An approved attendee that has not arrived yet
pub fn attendee_for(event: &Event, email: &str) -> Attendee {
    Attendee {
        id: Uuid::new_v4(),
        event_id: event.id,
        application_id: Uuid::new_v4(),
        user_email: email.to_string(),
        status: ApplicationStatus::Approved,
        checked_in: false,
        checked_in_at: None,
        checked_in_by: None,
        flagged: false,
        flag_reason: None,
        notes: Vec::new(),
        guests_brought: 0,
        version: 1,
        created_at: Utc::now(),
    }
}

pub fn role_change(event: &Event, email: &str, action: RoleAction, role: TeamRole) -> RoleChange {
    RoleChange {
        id: Uuid::new_v4(),
        event_id: event.id,
        user_email: email.to_string(),
        action,
        role,
        permissions: match action {
            RoleAction::Assign => role.permissions().to_vec(),
            RoleAction::Revoke => Vec::new(),
        },
        actor: event.created_by.clone(),
        recorded_at: Utc::now(),
    }
}
