//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::constants::verification_status;

/// User model, keyed by email
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub verification_status: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the user has completed phone verification
    pub fn is_verified(&self) -> bool {
        self.verification_status == verification_status::VERIFIED
    }
}

/// Fields for registering a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub password_hash: String,
}

/// Profile fields a user may change on themselves
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}
