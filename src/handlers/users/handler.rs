//! User handler implementations

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    handlers::auth::UserResponse,
    middleware::auth::AuthenticatedUser,
    services::UserService,
    state::AppState,
};

use super::request::UpdateProfileRequest;

/// Get the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserService::get_user(state.gateway(), &auth_user.email).await?;
    Ok(Json(user.into()))
}

/// Update the caller's profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    payload.validate()?;

    let user = UserService::update_profile(
        state.gateway(),
        &auth_user.email,
        payload.full_name.as_deref(),
        payload.phone.as_deref(),
        payload.bio.as_deref(),
    )
    .await?;

    Ok(Json(user.into()))
}
