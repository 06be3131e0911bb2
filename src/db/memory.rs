//! In-process gateway
//!
//! Keeps every entity in a single mutex-guarded state. Used by the test
//! suite and for running the service without PostgreSQL. Holds the same
//! guarantees as the PostgreSQL gateway: unique `(event, user)`
//! applications, versioned updates, and an atomic capacity check on
//! approval.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    constants::{roles, verification_status},
    error::{AppError, AppResult},
    models::{
        ApplicationChanges, ApplicationStatus, Attendee, AttendeeChanges, Event, EventApplication,
        EventChanges, NewApplication, NewAttendee, NewEvent, NewRoleChange, NewUser,
        ProfileChanges, Review, RoleChange, User,
    },
};

use super::gateway::{
    capacity_floor, ApplicationStore, AttendeeStore, EventStore, RoleStore, UserStore,
};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    events: Vec<Event>,
    role_history: Vec<RoleChange>,
    applications: Vec<EventApplication>,
    attendees: Vec<Attendee>,
}

/// Gateway storing everything in memory
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert an application without any checks, for corrupt-data scenarios
    #[cfg(test)]
    pub(crate) fn insert_raw_application(&self, application: EventApplication) {
        self.lock().applications.push(application);
    }
}

impl MemoryState {
    fn approved_count(&self, event_id: Uuid, except: Option<Uuid>) -> usize {
        self.applications
            .iter()
            .filter(|a| {
                a.event_id == event_id
                    && Some(a.id) != except
                    && a.status == ApplicationStatus::Approved
            })
            .count()
    }
}

fn stale(kind: &str, id: Uuid) -> AppError {
    AppError::Conflict(format!("{} {} was modified concurrently", kind, id))
}

#[async_trait]
impl UserStore for MemoryGateway {
    async fn create_user(&self, new: NewUser) -> AppResult<User> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.email == new.email) {
            return Err(AppError::AlreadyExists("Email already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            email: new.email,
            full_name: new.full_name,
            phone: new.phone,
            bio: None,
            role: roles::USER.to_string(),
            verification_status: verification_status::PENDING.to_string(),
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_profile(&self, email: &str, changes: ProfileChanges) -> AppResult<User> {
        let mut state = self.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(full_name) = changes.full_name {
            user.full_name = full_name;
        }
        if let Some(phone) = changes.phone {
            user.phone = Some(phone);
        }
        if let Some(bio) = changes.bio {
            user.bio = Some(bio);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_verification_status(&self, email: &str, status: &str) -> AppResult<()> {
        let mut state = self.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.verification_status = status.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryGateway {
    async fn create_event(&self, new: NewEvent) -> AppResult<Event> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            date: new.date,
            location_name: new.location_name,
            location_address: new.location_address,
            capacity: new.capacity,
            guest_passes_per_attendee: new.guest_passes_per_attendee,
            genres: new.genres,
            status: new.status,
            created_by: new.created_by,
            screening_required: new.screening_required,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.lock().events.push(event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        Ok(self.lock().events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        let mut events = self.lock().events.clone();
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    async fn update_event(
        &self,
        id: Uuid,
        expected_version: i32,
        changes: EventChanges,
    ) -> AppResult<Event> {
        let mut state = self.lock();
        let approved = state.approved_count(id, None);
        let event = state
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        if event.version != expected_version {
            return Err(stale("Event", id));
        }
        if let Some(capacity) = changes.capacity {
            if (capacity.max(0) as usize) < approved {
                return Err(capacity_floor(approved as i64));
            }
        }

        if let Some(name) = changes.name {
            event.name = name;
        }
        if let Some(description) = changes.description {
            event.description = Some(description);
        }
        if let Some(date) = changes.date {
            event.date = date;
        }
        if let Some(location_name) = changes.location_name {
            event.location_name = location_name;
        }
        if let Some(location_address) = changes.location_address {
            event.location_address = location_address;
        }
        if let Some(capacity) = changes.capacity {
            event.capacity = capacity;
        }
        if let Some(passes) = changes.guest_passes_per_attendee {
            event.guest_passes_per_attendee = passes;
        }
        if let Some(genres) = changes.genres {
            event.genres = genres;
        }
        if let Some(status) = changes.status {
            event.status = status;
        }
        if let Some(screening_required) = changes.screening_required {
            event.screening_required = screening_required;
        }
        event.version += 1;
        event.updated_at = Utc::now();
        Ok(event.clone())
    }
}

#[async_trait]
impl RoleStore for MemoryGateway {
    async fn append_role_change(&self, change: NewRoleChange) -> AppResult<RoleChange> {
        let entry = RoleChange {
            id: Uuid::new_v4(),
            permissions: change.permissions(),
            event_id: change.event_id,
            user_email: change.user_email,
            action: change.action,
            role: change.role,
            actor: change.actor,
            recorded_at: Utc::now(),
        };
        self.lock().role_history.push(entry.clone());
        Ok(entry)
    }

    async fn role_history(&self, event_id: Uuid) -> AppResult<Vec<RoleChange>> {
        Ok(self
            .lock()
            .role_history
            .iter()
            .filter(|c| c.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn role_history_for_user(&self, user_email: &str) -> AppResult<Vec<RoleChange>> {
        Ok(self
            .lock()
            .role_history
            .iter()
            .filter(|c| c.user_email == user_email)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ApplicationStore for MemoryGateway {
    async fn create_application(&self, new: NewApplication) -> AppResult<EventApplication> {
        let mut state = self.lock();
        if state
            .applications
            .iter()
            .any(|a| a.event_id == new.event_id && a.user_email == new.user_email)
        {
            return Err(AppError::AlreadyExists(
                "Already applied to this event".to_string(),
            ));
        }

        let now = Utc::now();
        let application = EventApplication {
            id: Uuid::new_v4(),
            event_id: new.event_id,
            user_email: new.user_email,
            application_message: new.application_message,
            guests_requested: new.guests_requested,
            status: ApplicationStatus::Pending,
            verified: false,
            verification_code_id: None,
            reviewed_by: None,
            reviewed_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        state.applications.push(application.clone());
        Ok(application)
    }

    async fn find_application(&self, id: Uuid) -> AppResult<Option<EventApplication>> {
        Ok(self.lock().applications.iter().find(|a| a.id == id).cloned())
    }

    async fn applications_for(
        &self,
        event_id: Uuid,
        user_email: &str,
    ) -> AppResult<Vec<EventApplication>> {
        Ok(self
            .lock()
            .applications
            .iter()
            .filter(|a| a.event_id == event_id && a.user_email == user_email)
            .cloned()
            .collect())
    }

    async fn list_applications_by_events(
        &self,
        event_ids: &[Uuid],
    ) -> AppResult<Vec<EventApplication>> {
        let mut applications: Vec<EventApplication> = self
            .lock()
            .applications
            .iter()
            .filter(|a| event_ids.contains(&a.event_id))
            .cloned()
            .collect();
        applications.reverse();
        Ok(applications)
    }

    async fn list_applications_by_user(&self, user_email: &str) -> AppResult<Vec<EventApplication>> {
        let mut applications: Vec<EventApplication> = self
            .lock()
            .applications
            .iter()
            .filter(|a| a.user_email == user_email)
            .cloned()
            .collect();
        applications.reverse();
        Ok(applications)
    }

    async fn count_approved(&self, event_id: Uuid) -> AppResult<i64> {
        Ok(self
            .lock()
            .applications
            .iter()
            .filter(|a| a.event_id == event_id && a.status == ApplicationStatus::Approved)
            .count() as i64)
    }

    async fn update_application(
        &self,
        id: Uuid,
        expected_version: i32,
        changes: ApplicationChanges,
    ) -> AppResult<EventApplication> {
        let mut state = self.lock();
        let application = state
            .applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
        if application.version != expected_version {
            return Err(stale("Application", id));
        }

        if let Some(verified) = changes.verified {
            application.verified = verified;
        }
        if let Some(code_id) = changes.verification_code_id {
            application.verification_code_id = Some(code_id);
        }
        application.version += 1;
        application.updated_at = Utc::now();
        Ok(application.clone())
    }

    async fn record_review(
        &self,
        id: Uuid,
        expected_version: i32,
        review: Review,
        enforce_capacity: bool,
    ) -> AppResult<EventApplication> {
        let mut state = self.lock();

        let event_id = state
            .applications
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.event_id)
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

        if enforce_capacity {
            let capacity = state
                .events
                .iter()
                .find(|e| e.id == event_id)
                .map(|e| e.capacity)
                .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
            if state.approved_count(event_id, Some(id)) >= capacity.max(0) as usize {
                return Err(AppError::CapacityExceeded { capacity });
            }
        }

        let application = state
            .applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
        if application.version != expected_version {
            return Err(stale("Application", id));
        }

        application.status = review.status;
        application.reviewed_by = Some(review.reviewed_by);
        application.reviewed_at = Some(review.reviewed_at);
        application.version += 1;
        application.updated_at = Utc::now();
        Ok(application.clone())
    }

    async fn delete_application(&self, id: Uuid, expected_version: i32) -> AppResult<()> {
        let mut state = self.lock();
        let position = state
            .applications
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
        if state.applications[position].version != expected_version {
            return Err(stale("Application", id));
        }
        state.applications.remove(position);
        Ok(())
    }
}

#[async_trait]
impl AttendeeStore for MemoryGateway {
    async fn create_attendee(&self, new: NewAttendee) -> AppResult<Attendee> {
        let mut state = self.lock();
        if state
            .attendees
            .iter()
            .any(|a| a.application_id == new.application_id)
        {
            return Err(AppError::AlreadyExists(
                "Application already has an attendee record".to_string(),
            ));
        }

        let attendee = Attendee {
            id: Uuid::new_v4(),
            event_id: new.event_id,
            application_id: new.application_id,
            user_email: new.user_email,
            status: ApplicationStatus::Approved,
            checked_in: false,
            checked_in_at: None,
            checked_in_by: None,
            flagged: false,
            flag_reason: None,
            notes: Vec::new(),
            guests_brought: new.guests_brought,
            version: 1,
            created_at: Utc::now(),
        };
        state.attendees.push(attendee.clone());
        Ok(attendee)
    }

    async fn find_attendee(&self, id: Uuid) -> AppResult<Option<Attendee>> {
        Ok(self.lock().attendees.iter().find(|a| a.id == id).cloned())
    }

    async fn find_attendee_by_application(&self, application_id: Uuid) -> AppResult<Option<Attendee>> {
        Ok(self
            .lock()
            .attendees
            .iter()
            .find(|a| a.application_id == application_id)
            .cloned())
    }

    async fn list_attendees_by_events(&self, event_ids: &[Uuid]) -> AppResult<Vec<Attendee>> {
        Ok(self
            .lock()
            .attendees
            .iter()
            .filter(|a| event_ids.contains(&a.event_id))
            .cloned()
            .collect())
    }

    async fn update_attendee(
        &self,
        id: Uuid,
        expected_version: i32,
        changes: AttendeeChanges,
    ) -> AppResult<Attendee> {
        let mut state = self.lock();
        let attendee = state
            .attendees
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound("Attendee not found".to_string()))?;
        if attendee.version != expected_version {
            return Err(stale("Attendee", id));
        }

        if let Some(check_in) = changes.check_in {
            attendee.checked_in = true;
            attendee.checked_in_at = Some(check_in.at);
            attendee.checked_in_by = Some(check_in.by);
        }
        if let Some(reason) = changes.flag_reason {
            attendee.flagged = true;
            attendee.flag_reason = Some(reason);
        }
        if let Some(note) = changes.append_note {
            attendee.notes.push(note);
        }
        attendee.version += 1;
        Ok(attendee.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventStatus, RoleAction, TeamRole};

    fn new_event(capacity: i32) -> NewEvent {
        NewEvent {
            name: "Basement".to_string(),
            description: None,
            date: Utc::now(),
            location_name: "Somewhere".to_string(),
            location_address: "1 Secret Lane".to_string(),
            capacity,
            guest_passes_per_attendee: 1,
            genres: vec![],
            status: EventStatus::Published,
            created_by: "host@example.com".to_string(),
            screening_required: true,
        }
    }

    fn new_application(event_id: Uuid, email: &str) -> NewApplication {
        NewApplication {
            event_id,
            user_email: email.to_string(),
            application_message: "hello".to_string(),
            guests_requested: 0,
        }
    }

    fn approval() -> Review {
        Review {
            status: ApplicationStatus::Approved,
            reviewed_by: "host@example.com".to_string(),
            reviewed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_application_is_rejected() {
        let gateway = MemoryGateway::new();
        let event = gateway.create_event(new_event(10)).await.unwrap();

        gateway.create_application(new_application(event.id, "a@example.com")).await.unwrap();
        let duplicate = gateway.create_application(new_application(event.id, "a@example.com")).await;
        assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_stale_version_is_a_conflict() {
        let gateway = MemoryGateway::new();
        let event = gateway.create_event(new_event(10)).await.unwrap();
        let application = gateway.create_application(new_application(event.id, "a@example.com")).await.unwrap();

        let changes = ApplicationChanges { verified: Some(true), ..Default::default() };
        let updated = gateway.update_application(application.id, 1, changes.clone()).await.unwrap();
        assert_eq!(updated.version, 2);

        let stale_write = gateway.update_application(application.id, 1, changes).await;
        assert!(matches!(stale_write, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_review_capacity_guard() {
        let gateway = MemoryGateway::new();
        let event = gateway.create_event(new_event(1)).await.unwrap();
        let first = gateway.create_application(new_application(event.id, "a@example.com")).await.unwrap();
        let second = gateway.create_application(new_application(event.id, "b@example.com")).await.unwrap();

        gateway.record_review(first.id, 1, approval(), true).await.unwrap();
        let over = gateway.record_review(second.id, 1, approval(), true).await;
        assert!(matches!(over, Err(AppError::CapacityExceeded { capacity: 1 })));
        assert_eq!(gateway.count_approved(event.id).await.unwrap(), 1);

        // unchecked writes (deny, waitlist) ignore capacity
        let waitlist = Review { status: ApplicationStatus::Waitlisted, ..approval() };
        let waitlisted = gateway.record_review(second.id, 1, waitlist, false).await.unwrap();
        assert_eq!(waitlisted.status, ApplicationStatus::Waitlisted);
    }

    #[tokio::test]
    async fn test_review_uses_capacity_stored_at_write_time() {
        let gateway = MemoryGateway::new();
        let event = gateway.create_event(new_event(2)).await.unwrap();
        let first = gateway.create_application(new_application(event.id, "a@example.com")).await.unwrap();
        let second = gateway.create_application(new_application(event.id, "b@example.com")).await.unwrap();
        gateway.record_review(first.id, 1, approval(), true).await.unwrap();

        // reviewer loaded the event at capacity 2, then the host shrank it
        let shrink = EventChanges { capacity: Some(1), ..Default::default() };
        gateway.update_event(event.id, event.version, shrink).await.unwrap();

        let over = gateway.record_review(second.id, 1, approval(), true).await;
        assert!(matches!(over, Err(AppError::CapacityExceeded { capacity: 1 })));
        assert_eq!(gateway.count_approved(event.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_capacity_edit_respects_approved_count() {
        let gateway = MemoryGateway::new();
        let event = gateway.create_event(new_event(2)).await.unwrap();
        for email in ["a@example.com", "b@example.com"] {
            let application = gateway.create_application(new_application(event.id, email)).await.unwrap();
            gateway.record_review(application.id, 1, approval(), true).await.unwrap();
        }

        let shrink = EventChanges { capacity: Some(1), ..Default::default() };
        let result = gateway.update_event(event.id, event.version, shrink).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let stored = gateway.find_event(event.id).await.unwrap().unwrap();
        assert_eq!((stored.capacity, stored.version), (2, event.version));

        let grow = EventChanges { capacity: Some(3), ..Default::default() };
        let grown = gateway.update_event(event.id, event.version, grow).await.unwrap();
        assert_eq!(grown.capacity, 3);
    }

    #[tokio::test]
    async fn test_notes_are_appended_in_order() {
        let gateway = MemoryGateway::new();
        let event = gateway.create_event(new_event(10)).await.unwrap();
        let attendee = gateway
            .create_attendee(NewAttendee {
                event_id: event.id,
                application_id: Uuid::new_v4(),
                user_email: "a@example.com".to_string(),
                guests_brought: 0,
            })
            .await
            .unwrap();

        let mut version = attendee.version;
        for text in ["first", "second"] {
            let note = crate::models::AttendeeNote {
                by: "door@example.com".to_string(),
                text: text.to_string(),
                timestamp: Utc::now(),
            };
            let changes = AttendeeChanges { append_note: Some(note), ..Default::default() };
            version = gateway.update_attendee(attendee.id, version, changes).await.unwrap().version;
        }

        let stored = gateway.find_attendee(attendee.id).await.unwrap().unwrap();
        let texts: Vec<&str> = stored.notes.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[tokio::test]
    async fn test_role_history_is_scoped() {
        let gateway = MemoryGateway::new();
        let event = gateway.create_event(new_event(10)).await.unwrap();
        gateway
            .append_role_change(NewRoleChange {
                event_id: event.id,
                user_email: "door@example.com".to_string(),
                action: RoleAction::Assign,
                role: TeamRole::Bouncer,
                actor: "host@example.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(gateway.role_history(event.id).await.unwrap().len(), 1);
        assert!(gateway.role_history(Uuid::new_v4()).await.unwrap().is_empty());
        let mine = gateway.role_history_for_user("door@example.com").await.unwrap();
        assert_eq!(mine[0].permissions, TeamRole::Bouncer.permissions().to_vec());
    }
}
