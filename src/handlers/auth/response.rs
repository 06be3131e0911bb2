//! Authentication response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::User;

/// Authentication token response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Public view of a user account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub verification_status: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            bio: user.bio,
            role: user.role,
            verification_status: user.verification_status,
            created_at: user.created_at,
        }
    }
}

/// Registration success response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Token refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Current user response (for /me endpoint)
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user: UserResponse,
}
