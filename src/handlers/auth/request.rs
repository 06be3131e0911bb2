//! Authentication request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_FULL_NAME_LENGTH, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// User registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = MIN_PASSWORD_LENGTH, max = MAX_PASSWORD_LENGTH))]
    pub password: String,

    #[validate(length(min = 1, max = MAX_FULL_NAME_LENGTH))]
    pub full_name: String,

    /// Needed before applying to events
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Logout request
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token of this session
    pub refresh_token: Option<String>,
    /// Invalidate all sessions if true
    pub all_sessions: Option<bool>,
}
