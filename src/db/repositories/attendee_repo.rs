//! Attendee repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::{
    db::gateway::AttendeeStore,
    error::{AppError, AppResult},
    models::{ApplicationStatus, Attendee, AttendeeChanges, AttendeeNote, NewAttendee},
};

use super::{parse_column, PgGateway};

/// Row of the `attendees` table
#[derive(Debug, FromRow)]
struct AttendeeRow {
    id: Uuid,
    event_id: Uuid,
    application_id: Uuid,
    user_email: String,
    status: String,
    checked_in: bool,
    checked_in_at: Option<DateTime<Utc>>,
    checked_in_by: Option<String>,
    flagged: bool,
    flag_reason: Option<String>,
    notes: Json<Vec<AttendeeNote>>,
    guests_brought: i32,
    version: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<AttendeeRow> for Attendee {
    type Error = AppError;

    fn try_from(row: AttendeeRow) -> Result<Self, Self::Error> {
        Ok(Attendee {
            status: parse_column("attendees.status", &row.status, ApplicationStatus::parse)?,
            id: row.id,
            event_id: row.event_id,
            application_id: row.application_id,
            user_email: row.user_email,
            checked_in: row.checked_in,
            checked_in_at: row.checked_in_at,
            checked_in_by: row.checked_in_by,
            flagged: row.flagged,
            flag_reason: row.flag_reason,
            notes: row.notes.0,
            guests_brought: row.guests_brought,
            version: row.version,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl AttendeeStore for PgGateway {
    async fn create_attendee(&self, new: NewAttendee) -> AppResult<Attendee> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            r#"
            INSERT INTO attendees (event_id, application_id, user_email, status, guests_brought)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.event_id)
        .bind(new.application_id)
        .bind(&new.user_email)
        .bind(ApplicationStatus::Approved.as_str())
        .bind(new.guests_brought)
        .fetch_one(self.pool())
        .await?;

        row.try_into()
    }

    async fn find_attendee(&self, id: Uuid) -> AppResult<Option<Attendee>> {
        let row = sqlx::query_as::<_, AttendeeRow>(r#"SELECT * FROM attendees WHERE id = $1"#)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.map(Attendee::try_from).transpose()
    }

    async fn find_attendee_by_application(&self, application_id: Uuid) -> AppResult<Option<Attendee>> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            r#"SELECT * FROM attendees WHERE application_id = $1"#,
        )
        .bind(application_id)
        .fetch_optional(self.pool())
        .await?;

        row.map(Attendee::try_from).transpose()
    }

    async fn list_attendees_by_events(&self, event_ids: &[Uuid]) -> AppResult<Vec<Attendee>> {
        let rows = sqlx::query_as::<_, AttendeeRow>(
            r#"SELECT * FROM attendees WHERE event_id = ANY($1) ORDER BY created_at"#,
        )
        .bind(event_ids)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(Attendee::try_from).collect()
    }

    async fn update_attendee(
        &self,
        id: Uuid,
        expected_version: i32,
        changes: AttendeeChanges,
    ) -> AppResult<Attendee> {
        let (checked_in_at, checked_in_by) = match changes.check_in {
            Some(stamp) => (Some(stamp.at), Some(stamp.by)),
            None => (None, None),
        };
        let note = changes.append_note.map(|note| Json(vec![note]));

        let row = sqlx::query_as::<_, AttendeeRow>(
            r#"
            UPDATE attendees
            SET
                checked_in = CASE WHEN $3::timestamptz IS NULL THEN checked_in ELSE TRUE END,
                checked_in_at = COALESCE($3, checked_in_at),
                checked_in_by = COALESCE($4, checked_in_by),
                flagged = CASE WHEN $5::text IS NULL THEN flagged ELSE TRUE END,
                flag_reason = COALESCE($5, flag_reason),
                notes = CASE WHEN $6::jsonb IS NULL THEN notes ELSE notes || $6::jsonb END,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(checked_in_at)
        .bind(checked_in_by)
        .bind(changes.flag_reason)
        .bind(note)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(self.missing_or_stale("attendees", "Attendee", id).await),
        }
    }
}
