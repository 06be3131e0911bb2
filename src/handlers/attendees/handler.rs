//! Attendee handler implementations

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::Attendee,
    services::DoorService,
    state::AppState,
};

use super::request::{FlagRequest, NoteRequest};

/// Check an attendee in
pub async fn check_in(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Attendee>> {
    let attendee = DoorService::check_in(state.gateway(), &auth_user.email, id).await?;
    Ok(Json(attendee))
}

/// Flag an attendee for security
pub async fn flag(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FlagRequest>,
) -> AppResult<Json<Attendee>> {
    payload.validate()?;

    let attendee = DoorService::flag(state.gateway(), &auth_user.email, id, &payload.reason).await?;
    Ok(Json(attendee))
}

/// Append a note
pub async fn add_note(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NoteRequest>,
) -> AppResult<Json<Attendee>> {
    payload.validate()?;

    let attendee = DoorService::add_note(state.gateway(), &auth_user.email, id, &payload.text).await?;
    Ok(Json(attendee))
}
