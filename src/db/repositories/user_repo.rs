//! User repository

use async_trait::async_trait;

use crate::{
    db::gateway::UserStore,
    error::{AppError, AppResult},
    models::{NewUser, ProfileChanges, User},
};

use super::PgGateway;

#[async_trait]
impl UserStore for PgGateway {
    async fn create_user(&self, new: NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, full_name, phone, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.phone)
        .bind(&new.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::AlreadyExists(_) => {
                AppError::AlreadyExists("Email already registered".to_string())
            }
            other => other,
        })?;

        Ok(user)
    }

    async fn find_user(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    async fn update_profile(&self, email: &str, changes: ProfileChanges) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                bio = COALESCE($4, bio),
                updated_at = NOW()
            WHERE email = $1
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(changes.full_name)
        .bind(changes.phone)
        .bind(changes.bio)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user)
    }

    async fn set_verification_status(&self, email: &str, status: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET verification_status = $2, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(status)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }
}
