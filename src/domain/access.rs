//! Role resolution
//!
//! Works out what one user may do on one event. The creator rule is
//! checked first; otherwise the user's active [`EventRole`] decides, with
//! permissions taken from the canonical table in [`TeamRole::permissions`]
//! rather than from the stored copy.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        ApplicationStatus, Event, EventApplication, EventRole, Permission, PermissionSet,
        RoleAction, RoleChange, TeamRole,
    },
};

/// Effective role of a user on an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedRole {
    Creator,
    Organizer,
    Bouncer,
    Performer,
    None,
}

impl From<TeamRole> for ResolvedRole {
    fn from(role: TeamRole) -> Self {
        match role {
            TeamRole::Organizer => Self::Organizer,
            TeamRole::Bouncer => Self::Bouncer,
            TeamRole::Performer => Self::Performer,
        }
    }
}

impl ResolvedRole {
    /// Canonical permissions of the role
    pub fn permissions(&self) -> PermissionSet {
        match self {
            Self::Creator => Permission::all(),
            Self::Organizer => TeamRole::Organizer.permission_set(),
            Self::Bouncer => TeamRole::Bouncer.permission_set(),
            Self::Performer => TeamRole::Performer.permission_set(),
            Self::None => PermissionSet::new(),
        }
    }
}

/// Result of resolving one `(user, event)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleResolution {
    pub event_id: Uuid,
    pub role: ResolvedRole,
    pub permissions: PermissionSet,
}

impl RoleResolution {
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Whether the user is on the event team at all
    pub fn is_team_member(&self) -> bool {
        self.role != ResolvedRole::None
    }
}

/// Resolve the role of `user_email` on `event`.
///
/// `roles` may contain assignments for other events and users; only the
/// ones matching this pair are considered. Two matching assignments are a
/// data integrity violation.
pub fn resolve_role(
    user_email: &str,
    event: &Event,
    roles: &[EventRole],
) -> AppResult<RoleResolution> {
    if event.is_creator(user_email) {
        return Ok(RoleResolution {
            event_id: event.id,
            role: ResolvedRole::Creator,
            permissions: Permission::all(),
        });
    }

    let mut matching = roles
        .iter()
        .filter(|r| r.event_id == event.id && r.user_email == user_email);

    let Some(assignment) = matching.next() else {
        return Ok(RoleResolution {
            event_id: event.id,
            role: ResolvedRole::None,
            permissions: PermissionSet::new(),
        });
    };

    if let Some(duplicate) = matching.next() {
        tracing::error!(
            event_id = %event.id,
            user_email = %user_email,
            first = %assignment.id,
            second = %duplicate.id,
            "Multiple active roles for one user on one event"
        );
        return Err(AppError::DataIntegrity(format!(
            "user {} holds more than one role on event {}",
            user_email, event.id
        )));
    }

    let canonical = assignment.role.permission_set();
    let stored: PermissionSet = assignment.permissions.iter().copied().collect();
    if stored != canonical {
        tracing::warn!(
            event_id = %event.id,
            role_id = %assignment.id,
            role = %assignment.role,
            "Stored permissions differ from the role table; using the table"
        );
    }

    Ok(RoleResolution {
        event_id: event.id,
        role: assignment.role.into(),
        permissions: canonical,
    })
}

/// Set membership check used to gate every mutating operation
pub fn has_permission(resolution: &RoleResolution, permission: Permission) -> bool {
    resolution.has(permission)
}

/// Fail with `Forbidden` unless the resolution grants `permission`
pub fn require_permission(resolution: &RoleResolution, permission: Permission) -> AppResult<()> {
    if has_permission(resolution, permission) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "missing {} permission on event {}",
            permission, resolution.event_id
        )))
    }
}

/// The exact address is shown to the event team and to approved applicants
pub fn address_visible(resolution: &RoleResolution, application: Option<&EventApplication>) -> bool {
    resolution.is_team_member()
        || application.is_some_and(|a| a.status == ApplicationStatus::Approved)
}

/// Fold an append-only role history into the currently active assignments.
///
/// `Revoke` removes every active assignment of that user on that event. An
/// `Assign` while one is already active is kept as a second assignment so
/// that resolution reports the inconsistency instead of hiding it.
pub fn active_roles(history: &[RoleChange]) -> Vec<EventRole> {
    let mut active: Vec<EventRole> = Vec::new();

    for change in history {
        match change.action {
            RoleAction::Assign => active.push(EventRole {
                id: change.id,
                event_id: change.event_id,
                user_email: change.user_email.clone(),
                role: change.role,
                permissions: change.permissions.clone(),
                assigned_by: change.actor.clone(),
                assigned_at: change.recorded_at,
            }),
            RoleAction::Revoke => active.retain(|r| {
                !(r.event_id == change.event_id && r.user_email == change.user_email)
            }),
        }
    }

    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{application_for, event_by, role_change};

    fn assignment(event: &Event, email: &str, role: TeamRole) -> EventRole {
        EventRole {
            id: Uuid::new_v4(),
            event_id: event.id,
            user_email: email.to_string(),
            role,
            permissions: role.permissions().to_vec(),
            assigned_by: event.created_by.clone(),
            assigned_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_creator_gets_everything_regardless_of_roles() {
        let event = event_by("host@example.com");
        let roles = vec![assignment(&event, "host@example.com", TeamRole::Performer)];

        let resolution = resolve_role("host@example.com", &event, &roles).unwrap();
        assert_eq!(resolution.role, ResolvedRole::Creator);
        assert_eq!(resolution.permissions, Permission::all());

        let without_roles = resolve_role("host@example.com", &event, &[]).unwrap();
        assert_eq!(without_roles.permissions, Permission::all());
    }

    #[test]
    fn test_role_permissions_follow_the_table() {
        let event = event_by("host@example.com");
        for role in [TeamRole::Organizer, TeamRole::Bouncer, TeamRole::Performer] {
            let roles = vec![assignment(&event, "crew@example.com", role)];
            let resolution = resolve_role("crew@example.com", &event, &roles).unwrap();

            for permission in Permission::ALL {
                assert_eq!(
                    has_permission(&resolution, permission),
                    role.permissions().contains(&permission),
                    "{role} / {permission}"
                );
            }
        }
    }

    #[test]
    fn test_tampered_stored_permissions_are_ignored() {
        let event = event_by("host@example.com");
        let mut bouncer = assignment(&event, "door@example.com", TeamRole::Bouncer);
        bouncer.permissions = Permission::ALL.to_vec();

        let resolution = resolve_role("door@example.com", &event, &[bouncer]).unwrap();
        assert_eq!(resolution.role, ResolvedRole::Bouncer);
        assert!(!resolution.has(Permission::ManageEvent));
        assert!(!resolution.has(Permission::ScreenAttendees));
        assert!(resolution.has(Permission::CheckIn));
    }

    #[test]
    fn test_resolution_is_scoped_to_one_event() {
        let event = event_by("host@example.com");
        let other = event_by("door@example.com");
        let roles = vec![assignment(&event, "door@example.com", TeamRole::Bouncer)];

        let on_event = resolve_role("door@example.com", &event, &roles).unwrap();
        assert_eq!(on_event.role, ResolvedRole::Bouncer);

        let on_other = resolve_role("door@example.com", &other, &roles).unwrap();
        assert_eq!(on_other.role, ResolvedRole::Creator);

        let stranger = resolve_role("nobody@example.com", &event, &roles).unwrap();
        assert_eq!(stranger.role, ResolvedRole::None);
        assert!(stranger.permissions.is_empty());
    }

    #[test]
    fn test_two_roles_for_one_pair_is_an_integrity_error() {
        let event = event_by("host@example.com");
        let roles = vec![
            assignment(&event, "crew@example.com", TeamRole::Bouncer),
            assignment(&event, "crew@example.com", TeamRole::Organizer),
        ];

        let result = resolve_role("crew@example.com", &event, &roles);
        assert!(matches!(result, Err(AppError::DataIntegrity(_))));
    }

    #[test]
    fn test_require_permission() {
        let event = event_by("host@example.com");
        let roles = vec![assignment(&event, "dj@example.com", TeamRole::Performer)];
        let resolution = resolve_role("dj@example.com", &event, &roles).unwrap();

        assert!(require_permission(&resolution, Permission::ViewDashboard).is_ok());
        assert!(matches!(
            require_permission(&resolution, Permission::CheckIn),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_active_roles_folds_assign_and_revoke() {
        let event = event_by("host@example.com");
        let history = vec![
            role_change(&event, "a@example.com", RoleAction::Assign, TeamRole::Bouncer),
            role_change(&event, "b@example.com", RoleAction::Assign, TeamRole::Performer),
            role_change(&event, "a@example.com", RoleAction::Revoke, TeamRole::Bouncer),
            role_change(&event, "a@example.com", RoleAction::Assign, TeamRole::Organizer),
        ];

        let active = active_roles(&history);
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].user_email, "b@example.com");
        assert_eq!(active[1].user_email, "a@example.com");
        assert_eq!(active[1].role, TeamRole::Organizer);
        assert_eq!(active[1].id, history[3].id);
    }

    #[test]
    fn test_double_assign_surfaces_on_resolution() {
        let event = event_by("host@example.com");
        let history = vec![
            role_change(&event, "a@example.com", RoleAction::Assign, TeamRole::Bouncer),
            role_change(&event, "a@example.com", RoleAction::Assign, TeamRole::Performer),
        ];

        let active = active_roles(&history);
        assert_eq!(active.len(), 2);
        assert!(matches!(
            resolve_role("a@example.com", &event, &active),
            Err(AppError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_address_visibility() {
        let event = event_by("host@example.com");
        let outsider = resolve_role("guest@example.com", &event, &[]).unwrap();
        let pending = application_for(&event, "guest@example.com", ApplicationStatus::Pending);
        let approved = application_for(&event, "guest@example.com", ApplicationStatus::Approved);

        assert!(!address_visible(&outsider, None));
        assert!(!address_visible(&outsider, Some(&pending)));
        assert!(address_visible(&outsider, Some(&approved)));

        let bouncer = vec![assignment(&event, "door@example.com", TeamRole::Bouncer)];
        let crew = resolve_role("door@example.com", &event, &bouncer).unwrap();
        assert!(address_visible(&crew, None));
    }
}
