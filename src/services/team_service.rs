//! Event team service
//!
//! Loads events together with the caller's role on them and manages the
//! role history. Every other service authorizes through [`TeamService::authorize`].

use uuid::Uuid;

use crate::{
    db::Gateway,
    domain::{active_roles, require_permission, resolve_role, RoleResolution},
    error::{AppError, AppResult},
    models::{Event, EventRole, NewRoleChange, Permission, RoleAction, RoleChange, TeamRole},
    utils::validation::{normalize_email, validate_email},
};

/// Event team service for role management
pub struct TeamService;

impl TeamService {
    /// Load an event or fail with `NotFound`
    pub async fn load_event(gw: &dyn Gateway, event_id: Uuid) -> AppResult<Event> {
        gw.find_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    /// Active assignments on one event
    pub async fn active_team(gw: &dyn Gateway, event_id: Uuid) -> AppResult<Vec<EventRole>> {
        let history = gw.role_history(event_id).await?;
        Ok(active_roles(&history))
    }

    /// Resolve what `user_email` may do on `event`
    pub async fn resolve(gw: &dyn Gateway, user_email: &str, event: &Event) -> AppResult<RoleResolution> {
        let team = Self::active_team(gw, event.id).await?;
        resolve_role(user_email, event, &team)
    }

    /// Load the event and fail with `Forbidden` unless the user holds `permission` on it
    pub async fn authorize(
        gw: &dyn Gateway,
        user_email: &str,
        event_id: Uuid,
        permission: Permission,
    ) -> AppResult<(Event, RoleResolution)> {
        let event = Self::load_event(gw, event_id).await?;
        let resolution = Self::resolve(gw, user_email, &event).await?;
        require_permission(&resolution, permission)?;
        Ok((event, resolution))
    }

    /// Give a user a role on the event
    pub async fn assign_role(
        gw: &dyn Gateway,
        actor: &str,
        event_id: Uuid,
        user_email: &str,
        role: TeamRole,
    ) -> AppResult<EventRole> {
        let (event, _) = Self::authorize(gw, actor, event_id, Permission::ManageEvent).await?;
        let member = Self::member_email(&event, user_email)?;
        Self::check_organizer_rule(&event, actor, role)?;

        let team = Self::active_team(gw, event_id).await?;
        if let Some(existing) = team.iter().find(|r| r.user_email == member) {
            return Err(AppError::AlreadyExists(format!(
                "{} is already {} on this event",
                member, existing.role
            )));
        }

        let change = gw
            .append_role_change(NewRoleChange {
                event_id,
                user_email: member,
                action: RoleAction::Assign,
                role,
                actor: actor.to_string(),
            })
            .await?;

        tracing::info!(
            event_id = %event_id,
            user_email = %change.user_email,
            role = %role,
            actor,
            "Role assigned"
        );

        Ok(Self::as_assignment(change))
    }

    /// Take a user's role on the event away
    pub async fn revoke_role(
        gw: &dyn Gateway,
        actor: &str,
        event_id: Uuid,
        user_email: &str,
    ) -> AppResult<RoleChange> {
        let (event, _) = Self::authorize(gw, actor, event_id, Permission::ManageEvent).await?;
        let member = Self::member_email(&event, user_email)?;
        let current = Self::current_role(gw, event_id, &member).await?;
        Self::check_organizer_rule(&event, actor, current.role)?;

        let change = gw
            .append_role_change(NewRoleChange {
                event_id,
                user_email: member,
                action: RoleAction::Revoke,
                role: current.role,
                actor: actor.to_string(),
            })
            .await?;

        tracing::info!(
            event_id = %event_id,
            user_email = %change.user_email,
            role = %current.role,
            actor,
            "Role revoked"
        );

        Ok(change)
    }

    /// Move a team member to another role: `Revoke` followed by `Assign`
    pub async fn change_role(
        gw: &dyn Gateway,
        actor: &str,
        event_id: Uuid,
        user_email: &str,
        role: TeamRole,
    ) -> AppResult<EventRole> {
        let (event, _) = Self::authorize(gw, actor, event_id, Permission::ManageEvent).await?;
        let member = Self::member_email(&event, user_email)?;
        let current = Self::current_role(gw, event_id, &member).await?;

        if current.role == role {
            return Ok(current);
        }
        Self::check_organizer_rule(&event, actor, current.role)?;
        Self::check_organizer_rule(&event, actor, role)?;

        gw.append_role_change(NewRoleChange {
            event_id,
            user_email: member.clone(),
            action: RoleAction::Revoke,
            role: current.role,
            actor: actor.to_string(),
        })
        .await?;
        let change = gw
            .append_role_change(NewRoleChange {
                event_id,
                user_email: member,
                action: RoleAction::Assign,
                role,
                actor: actor.to_string(),
            })
            .await?;

        tracing::info!(
            event_id = %event_id,
            user_email = %change.user_email,
            from = %current.role,
            to = %role,
            actor,
            "Role changed"
        );

        Ok(Self::as_assignment(change))
    }

    /// Current team of the event
    pub async fn list_team(gw: &dyn Gateway, actor: &str, event_id: Uuid) -> AppResult<Vec<EventRole>> {
        Self::authorize(gw, actor, event_id, Permission::ViewDashboard).await?;
        Self::active_team(gw, event_id).await
    }

    /// Full assign/revoke log of the event
    pub async fn role_history(gw: &dyn Gateway, actor: &str, event_id: Uuid) -> AppResult<Vec<RoleChange>> {
        Self::authorize(gw, actor, event_id, Permission::ManageEvent).await?;
        gw.role_history(event_id).await
    }

    fn member_email(event: &Event, user_email: &str) -> AppResult<String> {
        let email = normalize_email(user_email);
        validate_email(&email).map_err(|e| AppError::Validation(e.to_string()))?;
        if event.is_creator(&email) {
            return Err(AppError::Validation(
                "The event creator always holds the organizer role".to_string(),
            ));
        }
        Ok(email)
    }

    /// Only the creator hands out or takes away the organizer role
    fn check_organizer_rule(event: &Event, actor: &str, role: TeamRole) -> AppResult<()> {
        if role == TeamRole::Organizer && !event.is_creator(actor) {
            return Err(AppError::Forbidden(
                "Only the event creator can manage organizers".to_string(),
            ));
        }
        Ok(())
    }

    async fn current_role(gw: &dyn Gateway, event_id: Uuid, user_email: &str) -> AppResult<EventRole> {
        Self::active_team(gw, event_id)
            .await?
            .into_iter()
            .find(|r| r.user_email == user_email)
            .ok_or_else(|| AppError::NotFound(format!("{} has no role on this event", user_email)))
    }

    fn as_assignment(change: RoleChange) -> EventRole {
        EventRole {
            id: change.id,
            event_id: change.event_id,
            user_email: change.user_email,
            role: change.role,
            permissions: change.permissions,
            assigned_by: change.actor,
            assigned_at: change.recorded_at,
        }
    }
}
