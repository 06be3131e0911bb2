//! Event application repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::gateway::ApplicationStore,
    error::{AppError, AppResult},
    models::{ApplicationChanges, ApplicationStatus, EventApplication, NewApplication, Review},
};

use super::{parse_column, PgGateway};

/// Row of the `event_applications` table
#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    event_id: Uuid,
    user_email: String,
    application_message: String,
    guests_requested: i32,
    status: String,
    verified: bool,
    verification_code_id: Option<String>,
    reviewed_by: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for EventApplication {
    type Error = AppError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(EventApplication {
            status: parse_column("event_applications.status", &row.status, ApplicationStatus::parse)?,
            id: row.id,
            event_id: row.event_id,
            user_email: row.user_email,
            application_message: row.application_message,
            guests_requested: row.guests_requested,
            verified: row.verified,
            verification_code_id: row.verification_code_id,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_applications(rows: Vec<ApplicationRow>) -> AppResult<Vec<EventApplication>> {
    rows.into_iter().map(EventApplication::try_from).collect()
}

#[async_trait]
impl ApplicationStore for PgGateway {
    async fn create_application(&self, new: NewApplication) -> AppResult<EventApplication> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO event_applications (event_id, user_email, application_message, guests_requested)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new.event_id)
        .bind(&new.user_email)
        .bind(&new.application_message)
        .bind(new.guests_requested)
        .fetch_one(self.pool())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::AlreadyExists(_) => {
                AppError::AlreadyExists("Already applied to this event".to_string())
            }
            other => other,
        })?;

        row.try_into()
    }

    async fn find_application(&self, id: Uuid) -> AppResult<Option<EventApplication>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"SELECT * FROM event_applications WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(EventApplication::try_from).transpose()
    }

    async fn applications_for(
        &self,
        event_id: Uuid,
        user_email: &str,
    ) -> AppResult<Vec<EventApplication>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"SELECT * FROM event_applications WHERE event_id = $1 AND user_email = $2"#,
        )
        .bind(event_id)
        .bind(user_email)
        .fetch_all(self.pool())
        .await?;

        into_applications(rows)
    }

    async fn list_applications_by_events(
        &self,
        event_ids: &[Uuid],
    ) -> AppResult<Vec<EventApplication>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT * FROM event_applications
            WHERE event_id = ANY($1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(event_ids)
        .fetch_all(self.pool())
        .await?;

        into_applications(rows)
    }

    async fn list_applications_by_user(&self, user_email: &str) -> AppResult<Vec<EventApplication>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT * FROM event_applications
            WHERE user_email = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_email)
        .fetch_all(self.pool())
        .await?;

        into_applications(rows)
    }

    async fn count_approved(&self, event_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM event_applications WHERE event_id = $1 AND status = 'approved'"#,
        )
        .bind(event_id)
        .fetch_one(self.pool())
        .await?;

        Ok(count)
    }

    async fn update_application(
        &self,
        id: Uuid,
        expected_version: i32,
        changes: ApplicationChanges,
    ) -> AppResult<EventApplication> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE event_applications
            SET
                verified = COALESCE($3, verified),
                verification_code_id = COALESCE($4, verification_code_id),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(changes.verified)
        .bind(changes.verification_code_id)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(self.missing_or_stale("event_applications", "Application", id).await),
        }
    }

    async fn record_review(
        &self,
        id: Uuid,
        expected_version: i32,
        review: Review,
        enforce_capacity: bool,
    ) -> AppResult<EventApplication> {
        let mut tx = self.pool().begin().await?;

        if enforce_capacity {
            // Serialize approvals and capacity edits per event on the event row
            let locked: Option<(Uuid, i32)> = sqlx::query_as(
                r#"
                SELECT e.id, e.capacity FROM events e
                JOIN event_applications a ON a.event_id = e.id
                WHERE a.id = $1
                FOR UPDATE OF e
                "#,
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

            let (event_id, capacity) =
                locked.ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

            let approved: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM event_applications
                WHERE event_id = $1 AND status = 'approved' AND id <> $2
                "#,
            )
            .bind(event_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if approved >= i64::from(capacity) {
                return Err(AppError::CapacityExceeded { capacity });
            }
        }

        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE event_applications
            SET
                status = $3,
                reviewed_by = $4,
                reviewed_at = $5,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(review.status.as_str())
        .bind(&review.reviewed_by)
        .bind(review.reviewed_at)
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            Some(row) => {
                tx.commit().await?;
                row.try_into()
            }
            None => {
                tx.rollback().await?;
                Err(self.missing_or_stale("event_applications", "Application", id).await)
            }
        }
    }

    async fn delete_application(&self, id: Uuid, expected_version: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"DELETE FROM event_applications WHERE id = $1 AND version = $2"#,
        )
        .bind(id)
        .bind(expected_version)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_stale("event_applications", "Application", id).await);
        }

        Ok(())
    }
}
