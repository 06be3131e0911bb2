//! Event handler implementations

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
    services::{ApplicationService, DashboardService, DoorService, EventService},
    state::AppState,
};

use super::{
    request::{ChangeStatusRequest, CreateEventRequest, SubmitApplicationRequest, UpdateEventRequest},
    response::{
        ApplicationsListResponse, AttendeesListResponse, EventDetailResponse, EventResponse,
        EventStatsResponse, EventsListResponse, SubmitApplicationResponse,
    },
};

/// List events visible to the caller
pub async fn list_events(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<EventsListResponse>> {
    let events: Vec<EventResponse> = EventService::list_events(state.gateway(), &auth_user.email)
        .await?
        .into_iter()
        .map(|event| {
            let own = event.is_creator(&auth_user.email);
            EventResponse::new(event, own)
        })
        .collect();

    Ok(Json(EventsListResponse {
        total: events.len(),
        events,
    }))
}

/// Create a new event
pub async fn create_event(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<EventResponse>)> {
    payload.validate()?;

    let event = EventService::create_event(state.gateway(), &auth_user.email, payload).await?;

    Ok((StatusCode::CREATED, Json(EventResponse::new(event, true))))
}

/// Get one event with the caller's role on it
pub async fn get_event(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EventDetailResponse>> {
    let details = EventService::get_event(state.gateway(), &auth_user.email, id).await?;
    Ok(Json(details.into()))
}

/// Edit event details
pub async fn update_event(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> AppResult<Json<EventResponse>> {
    payload.validate()?;

    let event = EventService::update_event(state.gateway(), &auth_user.email, id, payload).await?;
    Ok(Json(EventResponse::new(event, true)))
}

/// Move an event to another lifecycle status
pub async fn change_status(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeStatusRequest>,
) -> AppResult<Json<EventResponse>> {
    let event = EventService::change_status(
        state.gateway(),
        &auth_user.email,
        id,
        payload.status,
        payload.expected_version,
    )
    .await?;
    Ok(Json(EventResponse::new(event, true)))
}

/// Application and door statistics
pub async fn get_stats(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EventStatsResponse>> {
    let stats = DashboardService::event_stats(state.gateway(), &auth_user.email, id).await?;
    Ok(Json(EventStatsResponse { event_id: id, stats }))
}

/// Door list
pub async fn list_attendees(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AttendeesListResponse>> {
    let attendees = DoorService::list_attendees(state.gateway(), &auth_user.email, id).await?;
    Ok(Json(AttendeesListResponse {
        total: attendees.len(),
        attendees,
    }))
}

/// Applications awaiting or past review
pub async fn list_applications(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApplicationsListResponse>> {
    let applications =
        ApplicationService::list_for_event(state.gateway(), &auth_user.email, id).await?;
    Ok(Json(ApplicationsListResponse {
        total: applications.len(),
        applications,
    }))
}

/// Apply to an event; a verification code goes to the caller's phone
pub async fn submit_application(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitApplicationRequest>,
) -> AppResult<(StatusCode, Json<SubmitApplicationResponse>)> {
    payload.validate()?;

    let (application, _) = ApplicationService::submit(
        state.gateway(),
        state.issuer(),
        &auth_user.email,
        id,
        &payload.application_message,
        payload.guests_requested,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitApplicationResponse {
            message: "Verification code sent".to_string(),
            application,
        }),
    ))
}
