//! Role history repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::gateway::RoleStore,
    error::{AppError, AppResult},
    models::{NewRoleChange, Permission, RoleAction, RoleChange, TeamRole},
};

use super::{parse_column, PgGateway};

/// Row of the `event_role_history` table
#[derive(Debug, FromRow)]
struct RoleChangeRow {
    id: Uuid,
    event_id: Uuid,
    user_email: String,
    action: String,
    role: String,
    permissions: Vec<String>,
    actor: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<RoleChangeRow> for RoleChange {
    type Error = AppError;

    fn try_from(row: RoleChangeRow) -> Result<Self, Self::Error> {
        let permissions = row
            .permissions
            .iter()
            .map(|p| parse_column("event_role_history.permissions", p, Permission::parse))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RoleChange {
            action: parse_column("event_role_history.action", &row.action, RoleAction::parse)?,
            role: parse_column("event_role_history.role", &row.role, TeamRole::parse)?,
            permissions,
            id: row.id,
            event_id: row.event_id,
            user_email: row.user_email,
            actor: row.actor,
            recorded_at: row.recorded_at,
        })
    }
}

const ROLE_COLUMNS: &str =
    "id, event_id, user_email, action, role, permissions, actor, recorded_at";

#[async_trait]
impl RoleStore for PgGateway {
    async fn append_role_change(&self, change: NewRoleChange) -> AppResult<RoleChange> {
        let permissions: Vec<&str> = change.permissions().iter().map(|p| p.as_str()).collect();

        let sql = format!(
            r#"
            INSERT INTO event_role_history (event_id, user_email, action, role, permissions, actor)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            ROLE_COLUMNS
        );
        let row = sqlx::query_as::<_, RoleChangeRow>(&sql)
            .bind(change.event_id)
            .bind(&change.user_email)
            .bind(change.action.as_str())
            .bind(change.role.as_str())
            .bind(&permissions)
            .bind(&change.actor)
            .fetch_one(self.pool())
            .await?;

        row.try_into()
    }

    async fn role_history(&self, event_id: Uuid) -> AppResult<Vec<RoleChange>> {
        let sql = format!(
            "SELECT {} FROM event_role_history WHERE event_id = $1 ORDER BY seq",
            ROLE_COLUMNS
        );
        let rows = sqlx::query_as::<_, RoleChangeRow>(&sql)
            .bind(event_id)
            .fetch_all(self.pool())
            .await?;

        rows.into_iter().map(RoleChange::try_from).collect()
    }

    async fn role_history_for_user(&self, user_email: &str) -> AppResult<Vec<RoleChange>> {
        let sql = format!(
            "SELECT {} FROM event_role_history WHERE user_email = $1 ORDER BY seq",
            ROLE_COLUMNS
        );
        let rows = sqlx::query_as::<_, RoleChangeRow>(&sql)
            .bind(user_email)
            .fetch_all(self.pool())
            .await?;

        rows.into_iter().map(RoleChange::try_from).collect()
    }
}
