//! Team handler implementations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::{EventRole, RoleChange},
    services::TeamService,
    state::AppState,
};

use super::{
    request::{AssignRoleRequest, ChangeRoleRequest},
    response::{RoleHistoryResponse, TeamResponse},
};

/// Active team members
pub async fn list_team(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TeamResponse>> {
    let members = TeamService::list_team(state.gateway(), &auth_user.email, id).await?;
    Ok(Json(TeamResponse { event_id: id, members }))
}

/// Assign a role
pub async fn assign_role(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRoleRequest>,
) -> AppResult<(StatusCode, Json<EventRole>)> {
    payload.validate()?;

    let role = TeamService::assign_role(
        state.gateway(),
        &auth_user.email,
        id,
        &payload.user_email,
        payload.role,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// Swap a member's role
pub async fn change_role(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path((id, email)): Path<(Uuid, String)>,
    Json(payload): Json<ChangeRoleRequest>,
) -> AppResult<Json<EventRole>> {
    let role =
        TeamService::change_role(state.gateway(), &auth_user.email, id, &email, payload.role).await?;
    Ok(Json(role))
}

/// Remove a member from the team
pub async fn revoke_role(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path((id, email)): Path<(Uuid, String)>,
) -> AppResult<Json<RoleChange>> {
    let change = TeamService::revoke_role(state.gateway(), &auth_user.email, id, &email).await?;
    Ok(Json(change))
}

/// Full role history
pub async fn role_history(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoleHistoryResponse>> {
    let history = TeamService::role_history(state.gateway(), &auth_user.email, id).await?;
    Ok(Json(RoleHistoryResponse { event_id: id, history }))
}
