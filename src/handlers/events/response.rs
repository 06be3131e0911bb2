//! Event response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{EventStats, ResolvedRole},
    models::{Attendee, Event, EventApplication, EventStatus, PermissionSet},
    services::EventDetails,
};

/// Event as returned to clients. The street address is withheld unless the
/// viewer may see it.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_address: Option<String>,
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

impl EventResponse {
    pub fn new(event: Event, show_address: bool) -> Self {
        Self {
            id: event.id,
            name: event.name,
            description: event.description,
            date: event.date,
            location_name: event.location_name,
            location_address: show_address.then_some(event.location_address),
            capacity: event.capacity,
            guest_passes_per_attendee: event.guest_passes_per_attendee,
            genres: event.genres,
            status: event.status,
            created_by: event.created_by,
            screening_required: event.screening_required,
            version: event.version,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Event list response
#[derive(Debug, Serialize)]
pub struct EventsListResponse {
    pub events: Vec<EventResponse>,
    pub total: usize,
}

/// One event together with the caller's relation to it
#[derive(Debug, Serialize)]
pub struct EventDetailResponse {
    pub event: EventResponse,
    pub role: ResolvedRole,
    pub permissions: PermissionSet,
    /// The caller's own application
    pub application: Option<EventApplication>,
}

impl From<EventDetails> for EventDetailResponse {
    fn from(details: EventDetails) -> Self {
        Self {
            event: EventResponse::new(details.event, details.address_visible),
            role: details.resolution.role,
            permissions: details.resolution.permissions,
            application: details.application,
        }
    }
}

/// Statistics response
#[derive(Debug, Serialize)]
pub struct EventStatsResponse {
    pub event_id: Uuid,
    pub stats: EventStats,
}

/// Applications of one event
#[derive(Debug, Serialize)]
pub struct ApplicationsListResponse {
    pub applications: Vec<EventApplication>,
    pub total: usize,
}

/// Newly submitted application
#[derive(Debug, Serialize)]
pub struct SubmitApplicationResponse {
    pub message: String,
    pub application: EventApplication,
}

/// Door list of one event
#[derive(Debug, Serialize)]
pub struct AttendeesListResponse {
    pub attendees: Vec<Attendee>,
    pub total: usize,
}
