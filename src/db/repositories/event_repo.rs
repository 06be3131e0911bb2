//! Event repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::gateway::{capacity_floor, EventStore},
    error::{AppError, AppResult},
    models::{Event, EventChanges, EventStatus, NewEvent},
};

use super::{parse_column, PgGateway};

/// Row of the `events` table
#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    date: DateTime<Utc>,
    location_name: String,
    location_address: String,
    capacity: i32,
    guest_passes_per_attendee: i32,
    genres: Vec<String>,
    status: String,
    created_by: String,
    screening_required: bool,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Event {
            status: parse_column("events.status", &row.status, EventStatus::parse)?,
            id: row.id,
            name: row.name,
            description: row.description,
            date: row.date,
            location_name: row.location_name,
            location_address: row.location_address,
            capacity: row.capacity,
            guest_passes_per_attendee: row.guest_passes_per_attendee,
            genres: row.genres,
            created_by: row.created_by,
            screening_required: row.screening_required,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl EventStore for PgGateway {
    async fn create_event(&self, new: NewEvent) -> AppResult<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (
                name, description, date, location_name, location_address, capacity,
                guest_passes_per_attendee, genres, status, created_by, screening_required
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.date)
        .bind(&new.location_name)
        .bind(&new.location_address)
        .bind(new.capacity)
        .bind(new.guest_passes_per_attendee)
        .bind(&new.genres)
        .bind(new.status.as_str())
        .bind(&new.created_by)
        .bind(new.screening_required)
        .fetch_one(self.pool())
        .await?;

        row.try_into()
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(r#"SELECT * FROM events WHERE id = $1"#)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.map(Event::try_from).transpose()
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(r#"SELECT * FROM events ORDER BY date ASC"#)
            .fetch_all(self.pool())
            .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn update_event(
        &self,
        id: Uuid,
        expected_version: i32,
        changes: EventChanges,
    ) -> AppResult<Event> {
        let mut tx = self.pool().begin().await?;

        if let Some(capacity) = changes.capacity {
            // Same row lock approvals take in record_review
            sqlx::query(r#"SELECT id FROM events WHERE id = $1 FOR UPDATE"#)
                .bind(id)
                .execute(&mut *tx)
                .await?;

            let approved: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM event_applications
                WHERE event_id = $1 AND status = 'approved'
                "#,
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if i64::from(capacity) < approved {
                return Err(capacity_floor(approved));
            }
        }

        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                date = COALESCE($5, date),
                location_name = COALESCE($6, location_name),
                location_address = COALESCE($7, location_address),
                capacity = COALESCE($8, capacity),
                guest_passes_per_attendee = COALESCE($9, guest_passes_per_attendee),
                genres = COALESCE($10, genres),
                status = COALESCE($11, status),
                screening_required = COALESCE($12, screening_required),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.date)
        .bind(changes.location_name)
        .bind(changes.location_address)
        .bind(changes.capacity)
        .bind(changes.guest_passes_per_attendee)
        .bind(changes.genres)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.screening_required)
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            Some(row) => {
                tx.commit().await?;
                row.try_into()
            }
            None => {
                tx.rollback().await?;
                Err(self.missing_or_stale("events", "Event", id).await)
            }
        }
    }
}
