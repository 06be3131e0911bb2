//! Application response DTOs

use serde::Serialize;

use crate::{
    models::{Attendee, EventApplication},
    services::Decided,
};

/// Applications of the caller
#[derive(Debug, Serialize)]
pub struct MyApplicationsResponse {
    pub applications: Vec<EventApplication>,
    pub total: usize,
}

/// Outcome of a decision
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub application: EventApplication,
    /// Door record, present once approved
    pub attendee: Option<Attendee>,
}

impl From<Decided> for DecisionResponse {
    fn from(decided: Decided) -> Self {
        Self {
            application: decided.application,
            attendee: decided.attendee,
        }
    }
}

/// Generic acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
