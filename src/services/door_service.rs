//! Door service: check-in, flags and notes on attendees

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::Gateway,
    domain::review::{door_note, plan_check_in, plan_flag},
    domain::CheckInPlan,
    error::{AppError, AppResult},
    models::{Attendee, AttendeeChanges, Permission},
};

use super::TeamService;

/// Door service for attendee operations
pub struct DoorService;

impl DoorService {
    /// Mark an approved attendee as arrived. Checking in twice returns the
    /// first stamp unchanged.
    pub async fn check_in(gw: &dyn Gateway, actor: &str, attendee_id: Uuid) -> AppResult<Attendee> {
        let attendee = Self::authorized(gw, actor, attendee_id, Permission::CheckIn).await?;

        let stamp = match plan_check_in(&attendee, actor, Utc::now())? {
            CheckInPlan::AlreadyCheckedIn => return Ok(attendee),
            CheckInPlan::Stamp(stamp) => stamp,
        };

        let result = gw
            .update_attendee(
                attendee.id,
                attendee.version,
                AttendeeChanges {
                    check_in: Some(stamp),
                    ..AttendeeChanges::default()
                },
            )
            .await;

        match result {
            Ok(updated) => {
                tracing::info!(
                    event_id = %updated.event_id,
                    attendee_id = %updated.id,
                    actor,
                    "Attendee checked in"
                );
                Ok(updated)
            }
            // someone else got there first; theirs is the stamp that counts
            Err(AppError::Conflict(_)) => {
                let current = Self::load(gw, attendee_id).await?;
                if current.checked_in {
                    Ok(current)
                } else {
                    Err(AppError::Conflict(
                        "Attendee changed during check-in".to_string(),
                    ))
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Flag an attendee for security. Approval is left untouched.
    pub async fn flag(gw: &dyn Gateway, actor: &str, attendee_id: Uuid, reason: &str) -> AppResult<Attendee> {
        let attendee = Self::authorized(gw, actor, attendee_id, Permission::FlagAttendees).await?;
        let (reason, note) = plan_flag(actor, reason, Utc::now())?;

        let updated = gw
            .update_attendee(
                attendee.id,
                attendee.version,
                AttendeeChanges {
                    flag_reason: Some(reason),
                    append_note: Some(note),
                    ..AttendeeChanges::default()
                },
            )
            .await?;

        tracing::warn!(
            event_id = %updated.event_id,
            attendee_id = %updated.id,
            actor,
            "Attendee flagged"
        );
        Ok(updated)
    }

    /// Append a free-form note
    pub async fn add_note(gw: &dyn Gateway, actor: &str, attendee_id: Uuid, text: &str) -> AppResult<Attendee> {
        let attendee = Self::authorized(gw, actor, attendee_id, Permission::FlagAttendees).await?;
        let note = door_note(actor, text, Utc::now())?;

        gw.update_attendee(
            attendee.id,
            attendee.version,
            AttendeeChanges {
                append_note: Some(note),
                ..AttendeeChanges::default()
            },
        )
        .await
    }

    /// Guest list for the door
    pub async fn list_attendees(gw: &dyn Gateway, actor: &str, event_id: Uuid) -> AppResult<Vec<Attendee>> {
        TeamService::authorize(gw, actor, event_id, Permission::CheckIn).await?;
        gw.list_attendees_by_events(&[event_id]).await
    }

    async fn load(gw: &dyn Gateway, attendee_id: Uuid) -> AppResult<Attendee> {
        gw.find_attendee(attendee_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attendee not found".to_string()))
    }

    async fn authorized(
        gw: &dyn Gateway,
        actor: &str,
        attendee_id: Uuid,
        permission: Permission,
    ) -> AppResult<Attendee> {
        let attendee = Self::load(gw, attendee_id).await?;
        TeamService::authorize(gw, actor, attendee.event_id, permission).await?;
        Ok(attendee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::AttendeeStore;
    use crate::models::{Attendee, TeamRole};
    use crate::services::test_support::{create_event, Harness, HOST};

    async fn approved_attendee(h: &Harness, email: &str) -> (crate::models::Event, Attendee) {
        let event = create_event(&h.gw, HOST).await;
        TeamService::assign_role(&h.gw, HOST, event.id, "door@example.com", TeamRole::Bouncer)
            .await
            .unwrap();
        let application = h.approved_application(&event, email).await;
        let attendee = h
            .gw
            .find_attendee_by_application(application.id)
            .await
            .unwrap()
            .unwrap();
        (event, attendee)
    }

    #[tokio::test]
    async fn test_check_in_is_idempotent() {
        let h = Harness::new();
        let (_, attendee) = approved_attendee(&h, "guest@example.com").await;

        let first = DoorService::check_in(&h.gw, "door@example.com", attendee.id)
            .await
            .unwrap();
        assert!(first.checked_in);
        assert_eq!(first.checked_in_by.as_deref(), Some("door@example.com"));

        let second = DoorService::check_in(&h.gw, HOST, attendee.id).await.unwrap();
        assert_eq!(second.checked_in_at, first.checked_in_at);
        assert_eq!(second.checked_in_by, first.checked_in_by);
        assert_eq!(second.version, first.version);
    }

    #[tokio::test]
    async fn test_performer_cannot_check_in() {
        let h = Harness::new();
        let (event, attendee) = approved_attendee(&h, "guest@example.com").await;
        TeamService::assign_role(&h.gw, HOST, event.id, "dj@example.com", TeamRole::Performer)
            .await
            .unwrap();

        let result = tokio_test::assert_err!(DoorService::check_in(&h.gw, "dj@example.com", attendee.id).await);
        assert!(matches!(result, AppError::Forbidden(_)));

        let guest = DoorService::check_in(&h.gw, "guest@example.com", attendee.id).await;
        assert!(matches!(guest, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_flag_requires_reason() {
        let h = Harness::new();
        let (_, attendee) = approved_attendee(&h, "guest@example.com").await;

        let empty = DoorService::flag(&h.gw, "door@example.com", attendee.id, "").await;
        assert!(matches!(empty, Err(AppError::Validation(_))));

        let flagged = DoorService::flag(&h.gw, "door@example.com", attendee.id, "suspicious ID")
            .await
            .unwrap();
        assert!(flagged.flagged);
        assert_eq!(flagged.flag_reason.as_deref(), Some("suspicious ID"));
        assert_eq!(flagged.notes.len(), 1);
        assert_eq!(flagged.notes[0].text, "FLAGGED: suspicious ID");
        assert_eq!(flagged.notes[0].by, "door@example.com");

        // flagging never revokes
        assert_eq!(flagged.status, attendee.status);
        tokio_test::assert_ok!(DoorService::check_in(&h.gw, "door@example.com", attendee.id).await);
    }

    #[tokio::test]
    async fn test_notes_keep_order() {
        let h = Harness::new();
        let (event, attendee) = approved_attendee(&h, "guest@example.com").await;

        DoorService::add_note(&h.gw, "door@example.com", attendee.id, "arrived with +1")
            .await
            .unwrap();
        DoorService::flag(&h.gw, HOST, attendee.id, "argued at the bar")
            .await
            .unwrap();
        let last = DoorService::add_note(&h.gw, "door@example.com", attendee.id, "left early")
            .await
            .unwrap();

        let texts: Vec<&str> = last.notes.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["arrived with +1", "FLAGGED: argued at the bar", "left early"]
        );

        let list = DoorService::list_attendees(&h.gw, "door@example.com", event.id)
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
    }
}
