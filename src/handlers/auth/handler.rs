//! Authentication handler implementations

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    services::{AuthService, UserService},
    state::AppState,
};

use super::{
    request::{LoginRequest, LogoutRequest, RefreshTokenRequest, RegisterRequest},
    response::{AuthResponse, CurrentUserResponse, LogoutResponse, RefreshResponse, RegisterResponse},
};

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    payload.validate()?;

    let user = AuthService::register(
        state.gateway(),
        &payload.email,
        &payload.password,
        &payload.full_name,
        payload.phone.as_deref(),
    )
    .await?;

    let response = RegisterResponse {
        message: "User registered successfully".to_string(),
        user: user.into(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.validate()?;

    let (user, tokens) = AuthService::login(
        state.gateway(),
        state.redis(),
        state.config(),
        &payload.email,
        &payload.password,
    )
    .await?;

    Ok(Json(AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.expires_in,
        user: user.into(),
    }))
}

/// Refresh access token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let tokens = AuthService::refresh_token(
        state.gateway(),
        state.redis(),
        state.config(),
        &payload.refresh_token,
    )
    .await?;

    Ok(Json(RefreshResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.expires_in,
    }))
}

/// Logout (invalidate refresh tokens)
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    payload: Option<Json<LogoutRequest>>,
) -> AppResult<Json<LogoutResponse>> {
    let (refresh_token, all_sessions) = match payload {
        Some(Json(p)) => (p.refresh_token, p.all_sessions.unwrap_or(false)),
        None => (None, false),
    };

    AuthService::logout(
        state.redis(),
        &auth_user.email,
        refresh_token.as_deref(),
        all_sessions,
    )
    .await?;

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<CurrentUserResponse>> {
    let user = UserService::get_user(state.gateway(), &auth_user.email).await?;

    Ok(Json(CurrentUserResponse { user: user.into() }))
}
