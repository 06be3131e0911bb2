//! Team response DTOs

use serde::Serialize;
use uuid::Uuid;

use crate::models::{EventRole, RoleChange};

/// Active team of one event
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub event_id: Uuid,
    pub members: Vec<EventRole>,
}

/// Assign/revoke log of one event, oldest first
#[derive(Debug, Serialize)]
pub struct RoleHistoryResponse {
    pub event_id: Uuid,
    pub history: Vec<RoleChange>,
}
