//! Application handler implementations

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
    models::EventApplication,
    services::ApplicationService,
    state::AppState,
};

use super::{
    request::{DecisionRequest, VerifyCodeRequest},
    response::{DecisionResponse, MessageResponse, MyApplicationsResponse},
};

/// Applications submitted by the caller
pub async fn my_applications(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<MyApplicationsResponse>> {
    let applications = ApplicationService::mine(state.gateway(), &auth_user.email).await?;
    Ok(Json(MyApplicationsResponse {
        total: applications.len(),
        applications,
    }))
}

/// Confirm the caller's phone for an application
pub async fn verify(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<VerifyCodeRequest>,
) -> AppResult<Json<EventApplication>> {
    payload.validate()?;

    let application = ApplicationService::verify(
        state.gateway(),
        state.issuer(),
        &auth_user.email,
        id,
        &payload.code,
    )
    .await?;

    Ok(Json(application))
}

/// Send a fresh code
pub async fn resend_code(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    ApplicationService::resend_code(state.gateway(), state.issuer(), &auth_user.email, id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Verification code sent".to_string(),
        }),
    ))
}

/// Approve, deny or waitlist
pub async fn decide(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> AppResult<Json<DecisionResponse>> {
    let decided = ApplicationService::decide(
        state.gateway(),
        &auth_user.email,
        id,
        payload.decision,
        payload.expected_version,
    )
    .await?;

    Ok(Json(decided.into()))
}

/// Withdraw a pending application
pub async fn withdraw(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ApplicationService::withdraw(state.gateway(), &auth_user.email, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
