//! Application request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::models::Decision;

/// Code received by SMS
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
}

/// Organizer decision on an application
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
    /// Version the reviewer looked at; a newer stored version fails with 409
    pub expected_version: Option<i32>,
}
