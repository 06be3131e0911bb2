//! Team request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::models::TeamRole;

/// Give a user a role on the event
#[derive(Debug, Deserialize, Validate)]
pub struct AssignRoleRequest {
    #[validate(email)]
    pub user_email: String,

    pub role: TeamRole,
}

/// Replace a member's role
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: TeamRole,
}
