//! Event request DTOs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::{
    constants::{
        MAX_APPLICATION_MESSAGE_LENGTH, MAX_EVENT_DESCRIPTION_LENGTH, MAX_EVENT_NAME_LENGTH, MAX_GUEST_PASSES_PER_ATTENDEE,
        MAX_LOCATION_LENGTH,
    },
    models::EventStatus,
};

/// Create event request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = MAX_EVENT_NAME_LENGTH))]
    pub name: String,

    #[validate(length(max = MAX_EVENT_DESCRIPTION_LENGTH))]
    pub description: Option<String>,

    pub date: DateTime<Utc>,

    #[validate(length(min = 1, max = MAX_LOCATION_LENGTH))]
    pub location_name: String,

    /// Shown only to approved attendees and the team
    #[validate(length(min = 1, max = MAX_LOCATION_LENGTH))]
    pub location_address: String,

    /// Defaults to 50
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,

    /// Defaults to 1
    #[validate(range(min = 0, max = MAX_GUEST_PASSES_PER_ATTENDEE))]
    pub guest_passes_per_attendee: Option<i32>,

    #[serde(default)]
    pub genres: Vec<String>,

    /// Defaults to true
    pub screening_required: Option<bool>,

    /// Keep the event in draft instead of publishing it
    #[serde(default)]
    pub draft: bool,
}

/// Update event request; omitted fields stay unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = MAX_EVENT_NAME_LENGTH))]
    pub name: Option<String>,

    #[validate(length(max = MAX_EVENT_DESCRIPTION_LENGTH))]
    pub description: Option<String>,

    pub date: Option<DateTime<Utc>>,

    #[validate(length(min = 1, max = MAX_LOCATION_LENGTH))]
    pub location_name: Option<String>,

    #[validate(length(min = 1, max = MAX_LOCATION_LENGTH))]
    pub location_address: Option<String>,

    #[validate(range(min = 1))]
    pub capacity: Option<i32>,

    #[validate(range(min = 0, max = MAX_GUEST_PASSES_PER_ATTENDEE))]
    pub guest_passes_per_attendee: Option<i32>,

    pub genres: Option<Vec<String>>,

    pub screening_required: Option<bool>,

    /// Version the client last read; a newer stored version fails with 409
    pub expected_version: Option<i32>,
}

/// Status transition request
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: EventStatus,
    pub expected_version: Option<i32>,
}

/// Application to an event
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitApplicationRequest {
    #[validate(length(min = 1, max = MAX_APPLICATION_MESSAGE_LENGTH))]
    pub application_message: String,

    /// Bounded by the event's guest passes
    #[serde(default)]
    #[validate(range(min = 0))]
    pub guests_requested: i32,
}
