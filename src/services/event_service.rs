//! Event service

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    constants::{DEFAULT_EVENT_CAPACITY, DEFAULT_GUEST_PASSES},
    db::Gateway,
    domain::{active_roles, address_visible, RoleResolution},
    error::{AppError, AppResult},
    handlers::events::request::{CreateEventRequest, UpdateEventRequest},
    models::{Event, EventApplication, EventChanges, EventStatus, NewEvent, Permission},
    utils::validation::{normalize_genres, sanitize_string},
};

use super::{ApplicationService, TeamService};

/// One event as seen by one viewer
#[derive(Debug, Clone)]
pub struct EventDetails {
    pub event: Event,
    pub resolution: RoleResolution,
    /// The viewer's own application, if any
    pub application: Option<EventApplication>,
    pub address_visible: bool,
}

/// Event service for business logic
pub struct EventService;

impl EventService {
    /// Create an event owned by `creator`. The creator's organizer rights are
    /// implicit, so no role row is written.
    pub async fn create_event(
        gw: &dyn Gateway,
        creator: &str,
        payload: CreateEventRequest,
    ) -> AppResult<Event> {
        let name = Self::required_text("Event name", &payload.name)?;
        let genres = normalize_genres(&payload.genres).map_err(AppError::Validation)?;

        let event = gw
            .create_event(NewEvent {
                name,
                description: payload.description.map(|d| sanitize_string(&d)),
                date: payload.date,
                location_name: Self::required_text("Location name", &payload.location_name)?,
                location_address: Self::required_text("Location address", &payload.location_address)?,
                capacity: payload.capacity.unwrap_or(DEFAULT_EVENT_CAPACITY),
                guest_passes_per_attendee: payload
                    .guest_passes_per_attendee
                    .unwrap_or(DEFAULT_GUEST_PASSES),
                genres,
                status: if payload.draft {
                    EventStatus::Draft
                } else {
                    EventStatus::Published
                },
                created_by: creator.to_string(),
                screening_required: payload.screening_required.unwrap_or(true),
            })
            .await?;

        tracing::info!(event_id = %event.id, creator, status = %event.status, "Event created");
        Ok(event)
    }

    /// Load an event for a viewer. Drafts are only visible to the team.
    pub async fn get_event(gw: &dyn Gateway, viewer: &str, event_id: Uuid) -> AppResult<EventDetails> {
        let event = TeamService::load_event(gw, event_id).await?;
        let resolution = TeamService::resolve(gw, viewer, &event).await?;

        if event.status == EventStatus::Draft && !resolution.is_team_member() {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        let application = ApplicationService::existing(gw, event_id, viewer).await?;
        let address_visible = address_visible(&resolution, application.as_ref());

        Ok(EventDetails {
            event,
            resolution,
            application,
            address_visible,
        })
    }

    /// Events the viewer can browse: everything public plus drafts they work on
    pub async fn list_events(gw: &dyn Gateway, viewer: &str) -> AppResult<Vec<Event>> {
        let history = gw.role_history_for_user(viewer).await?;
        let team_events: HashSet<Uuid> = active_roles(&history).iter().map(|r| r.event_id).collect();

        let events = gw.list_events().await?;
        Ok(events
            .into_iter()
            .filter(|e| {
                e.status.is_public() || e.is_creator(viewer) || team_events.contains(&e.id)
            })
            .collect())
    }

    /// Edit event details
    pub async fn update_event(
        gw: &dyn Gateway,
        actor: &str,
        event_id: Uuid,
        payload: UpdateEventRequest,
    ) -> AppResult<Event> {
        let (event, _) = TeamService::authorize(gw, actor, event_id, Permission::ManageEvent).await?;

        let changes = EventChanges {
            name: payload
                .name
                .as_deref()
                .map(|n| Self::required_text("Event name", n))
                .transpose()?,
            description: payload.description.map(|d| sanitize_string(&d)),
            date: payload.date,
            location_name: payload
                .location_name
                .as_deref()
                .map(|n| Self::required_text("Location name", n))
                .transpose()?,
            location_address: payload
                .location_address
                .as_deref()
                .map(|a| Self::required_text("Location address", a))
                .transpose()?,
            capacity: payload.capacity,
            guest_passes_per_attendee: payload.guest_passes_per_attendee,
            genres: payload
                .genres
                .as_deref()
                .map(normalize_genres)
                .transpose()
                .map_err(AppError::Validation)?,
            status: None,
            screening_required: payload.screening_required,
        };

        let updated = gw
            .update_event(
                event_id,
                payload.expected_version.unwrap_or(event.version),
                changes,
            )
            .await?;

        tracing::info!(event_id = %event_id, actor, version = updated.version, "Event updated");
        Ok(updated)
    }

    /// Move the event through its lifecycle
    pub async fn change_status(
        gw: &dyn Gateway,
        actor: &str,
        event_id: Uuid,
        status: EventStatus,
        expected_version: Option<i32>,
    ) -> AppResult<Event> {
        let (event, _) = TeamService::authorize(gw, actor, event_id, Permission::ManageEvent).await?;

        if !event.status.can_transition_to(status) {
            return Err(AppError::Validation(format!(
                "Cannot move an event from {} to {}",
                event.status, status
            )));
        }

        let updated = gw
            .update_event(
                event_id,
                expected_version.unwrap_or(event.version),
                EventChanges {
                    status: Some(status),
                    ..EventChanges::default()
                },
            )
            .await?;

        tracing::info!(event_id = %event_id, actor, from = %event.status, to = %status, "Event status changed");
        Ok(updated)
    }

    fn required_text(field: &str, value: &str) -> AppResult<String> {
        let value = sanitize_string(value);
        if value.is_empty() {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::db::MemoryGateway;
    use crate::models::TeamRole;
    use crate::services::test_support::{create_event, create_event_with, event_input, Harness, HOST};

    fn create_request() -> CreateEventRequest {
        CreateEventRequest {
            name: "  Basement Sessions ".to_string(),
            description: None,
            date: Utc::now() + Duration::days(3),
            location_name: "The Vault".to_string(),
            location_address: "1 Cellar Lane".to_string(),
            capacity: None,
            guest_passes_per_attendee: None,
            genres: vec!["Techno".to_string(), "techno".to_string(), "ambient".to_string()],
            screening_required: None,
            draft: false,
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let gw = MemoryGateway::new();
        let event = EventService::create_event(&gw, HOST, create_request()).await.unwrap();

        assert_eq!(event.name, "Basement Sessions");
        assert_eq!(event.capacity, 50);
        assert_eq!(event.guest_passes_per_attendee, 1);
        assert_eq!(event.status, EventStatus::Published);
        assert_eq!(event.genres, vec!["techno", "ambient"]);
        assert!(event.screening_required);

        // creator rights are implicit
        assert!(TeamService::active_team(&gw, event.id).await.unwrap().is_empty());
        let resolution = TeamService::resolve(&gw, HOST, &event).await.unwrap();
        assert_eq!(resolution.permissions, Permission::all());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_genre() {
        let gw = MemoryGateway::new();
        let mut request = create_request();
        request.genres = vec!["polka".to_string()];

        let result = EventService::create_event(&gw, HOST, request).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_drafts_hidden_from_outsiders() {
        let gw = MemoryGateway::new();
        let mut input = event_input(HOST);
        input.status = EventStatus::Draft;
        let draft = create_event_with(&gw, input).await;
        let public = create_event(&gw, HOST).await;

        let listed = EventService::list_events(&gw, "guest@example.com").await.unwrap();
        assert_eq!(listed.iter().map(|e| e.id).collect::<Vec<_>>(), vec![public.id]);
        assert!(matches!(
            EventService::get_event(&gw, "guest@example.com", draft.id).await,
            Err(AppError::NotFound(_))
        ));

        TeamService::assign_role(&gw, HOST, draft.id, "dj@example.com", TeamRole::Performer)
            .await
            .unwrap();
        let for_dj = EventService::list_events(&gw, "dj@example.com").await.unwrap();
        assert_eq!(for_dj.len(), 2);
        assert!(EventService::get_event(&gw, "dj@example.com", draft.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_address_revealed_after_approval() {
        let h = Harness::new();
        let event = create_event(&h.gw, HOST).await;

        let application = h.verified_application(&event, "guest@example.com").await;
        let before = EventService::get_event(&h.gw, "guest@example.com", event.id).await.unwrap();
        assert!(!before.address_visible);
        assert_eq!(before.application.map(|a| a.id), Some(application.id));

        h.approved_application(&event, "other@example.com").await;
        let other = EventService::get_event(&h.gw, "other@example.com", event.id).await.unwrap();
        assert!(other.address_visible);
    }

    #[tokio::test]
    async fn test_status_transitions_enforced() {
        let gw = MemoryGateway::new();
        let event = create_event(&gw, HOST).await;

        let live = EventService::change_status(&gw, HOST, event.id, EventStatus::Live, None)
            .await
            .unwrap();
        assert_eq!(live.status, EventStatus::Live);

        let back = EventService::change_status(&gw, HOST, event.id, EventStatus::Draft, None).await;
        assert!(matches!(back, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_bouncer_cannot_edit() {
        let gw = MemoryGateway::new();
        let event = create_event(&gw, HOST).await;
        TeamService::assign_role(&gw, HOST, event.id, "door@example.com", TeamRole::Bouncer)
            .await
            .unwrap();

        let result = EventService::update_event(
            &gw,
            "door@example.com",
            event.id,
            UpdateEventRequest {
                name: Some("Renamed".to_string()),
                ..UpdateEventRequest::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let gw = MemoryGateway::new();
        let event = create_event(&gw, HOST).await;

        EventService::update_event(
            &gw,
            HOST,
            event.id,
            UpdateEventRequest {
                capacity: Some(80),
                expected_version: Some(event.version),
                ..UpdateEventRequest::default()
            },
        )
        .await
        .unwrap();

        let stale = EventService::update_event(
            &gw,
            HOST,
            event.id,
            UpdateEventRequest {
                capacity: Some(90),
                expected_version: Some(event.version),
                ..UpdateEventRequest::default()
            },
        )
        .await;
        assert!(matches!(stale, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_capacity_not_below_approved() {
        let h = Harness::new();
        let event = create_event(&h.gw, HOST).await;
        h.approved_application(&event, "a@example.com").await;
        h.approved_application(&event, "b@example.com").await;

        let result = EventService::update_event(
            &h.gw,
            HOST,
            event.id,
            UpdateEventRequest {
                capacity: Some(1),
                ..UpdateEventRequest::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
