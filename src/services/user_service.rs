//! User service

use crate::{
    constants::verification_status,
    db::Gateway,
    error::{AppError, AppResult},
    models::{ProfileChanges, User},
    utils::validation::{normalize_phone, sanitize_string},
};

/// User service for business logic
pub struct UserService;

impl UserService {
    /// Get user by email
    pub async fn get_user(gw: &dyn Gateway, email: &str) -> AppResult<User> {
        gw.find_user(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Update the caller's own profile. A new phone number has to be
    /// verified again.
    pub async fn update_profile(
        gw: &dyn Gateway,
        email: &str,
        full_name: Option<&str>,
        phone: Option<&str>,
        bio: Option<&str>,
    ) -> AppResult<User> {
        let current = Self::get_user(gw, email).await?;

        let full_name = match full_name.map(sanitize_string) {
            Some(name) if name.is_empty() => {
                return Err(AppError::Validation("Full name cannot be empty".to_string()));
            }
            other => other,
        };
        let phone = phone
            .map(normalize_phone)
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let phone_changed = phone.is_some() && phone != current.phone;

        let user = gw
            .update_profile(
                email,
                ProfileChanges {
                    full_name,
                    phone,
                    bio: bio.map(sanitize_string),
                },
            )
            .await?;

        if phone_changed && user.is_verified() {
            gw.set_verification_status(email, verification_status::PENDING)
                .await?;
            tracing::info!(email, "Phone number changed, verification reset");
            return Self::get_user(gw, email).await;
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryGateway, UserStore};
    use crate::services::test_support::register;

    #[tokio::test]
    async fn test_update_profile_normalizes_phone() {
        let gw = MemoryGateway::new();
        register(&gw, "guest@example.com").await;

        let user = UserService::update_profile(
            &gw,
            "guest@example.com",
            Some(" Guest Name "),
            Some("+1 (555) 010-2000"),
            Some("Regular at the warehouse"),
        )
        .await
        .unwrap();

        assert_eq!(user.full_name, "Guest Name");
        assert_eq!(user.phone.as_deref(), Some("+15550102000"));
        assert_eq!(user.bio.as_deref(), Some("Regular at the warehouse"));
    }

    #[tokio::test]
    async fn test_invalid_phone_rejected() {
        let gw = MemoryGateway::new();
        register(&gw, "guest@example.com").await;

        let result = UserService::update_profile(&gw, "guest@example.com", None, Some("123"), None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_new_phone_resets_verification() {
        let gw = MemoryGateway::new();
        register(&gw, "guest@example.com").await;
        gw.set_verification_status("guest@example.com", verification_status::VERIFIED)
            .await
            .unwrap();

        let user = UserService::update_profile(&gw, "guest@example.com", None, Some("+15550109999"), None)
            .await
            .unwrap();
        assert!(!user.is_verified());
    }
}
