//! Entity gateway
//!
//! Storage seam for the five entity types. Services only ever talk to a
//! [`Gateway`]; [`PgGateway`](super::PgGateway) backs it with PostgreSQL and
//! [`MemoryGateway`](super::MemoryGateway) keeps everything in process.
//!
//! Updates that can race (applications, attendees, events) take the version
//! the caller read and fail with [`AppError::Conflict`](crate::error::AppError)
//! when the stored row has moved on.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        ApplicationChanges, Attendee, AttendeeChanges, Event, EventApplication, EventChanges,
        NewApplication, NewAttendee, NewEvent, NewRoleChange, NewUser, ProfileChanges, Review,
        RoleChange, User,
    },
};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `AlreadyExists` when the email is taken
    async fn create_user(&self, new: NewUser) -> AppResult<User>;

    async fn find_user(&self, email: &str) -> AppResult<Option<User>>;

    /// Fails with `NotFound` when the user does not exist
    async fn update_profile(&self, email: &str, changes: ProfileChanges) -> AppResult<User>;

    async fn set_verification_status(&self, email: &str, status: &str) -> AppResult<()>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(&self, new: NewEvent) -> AppResult<Event>;

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>>;

    /// All events, soonest first
    async fn list_events(&self) -> AppResult<Vec<Event>>;

    /// Fails with `Validation` when a new capacity is below the approved count.
    /// The count is taken under the same event lock `record_review` holds.
    async fn update_event(
        &self,
        id: Uuid,
        expected_version: i32,
        changes: EventChanges,
    ) -> AppResult<Event>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Append one entry to the role history
    async fn append_role_change(&self, change: NewRoleChange) -> AppResult<RoleChange>;

    /// History of one event in insertion order
    async fn role_history(&self, event_id: Uuid) -> AppResult<Vec<RoleChange>>;

    /// History of one user across all events in insertion order
    async fn role_history_for_user(&self, user_email: &str) -> AppResult<Vec<RoleChange>>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Fails with `AlreadyExists` when the user already applied to the event
    async fn create_application(&self, new: NewApplication) -> AppResult<EventApplication>;

    async fn find_application(&self, id: Uuid) -> AppResult<Option<EventApplication>>;

    /// Every application for one `(event, user)` pair; more than one is corrupt data
    async fn applications_for(
        &self,
        event_id: Uuid,
        user_email: &str,
    ) -> AppResult<Vec<EventApplication>>;

    /// Applications for the given events, newest first
    async fn list_applications_by_events(
        &self,
        event_ids: &[Uuid],
    ) -> AppResult<Vec<EventApplication>>;

    /// Applications of one user, newest first
    async fn list_applications_by_user(&self, user_email: &str) -> AppResult<Vec<EventApplication>>;

    async fn count_approved(&self, event_id: Uuid) -> AppResult<i64>;

    async fn update_application(
        &self,
        id: Uuid,
        expected_version: i32,
        changes: ApplicationChanges,
    ) -> AppResult<EventApplication>;

    /// Write a review stamp. With `enforce_capacity`, the store locks the event,
    /// reads its current capacity, re-counts approved applications and fails
    /// with `CapacityExceeded` when full.
    async fn record_review(
        &self,
        id: Uuid,
        expected_version: i32,
        review: Review,
        enforce_capacity: bool,
    ) -> AppResult<EventApplication>;

    async fn delete_application(&self, id: Uuid, expected_version: i32) -> AppResult<()>;
}

#[async_trait]
pub trait AttendeeStore: Send + Sync {
    /// Fails with `AlreadyExists` when the application already has an attendee
    async fn create_attendee(&self, new: NewAttendee) -> AppResult<Attendee>;

    async fn find_attendee(&self, id: Uuid) -> AppResult<Option<Attendee>>;

    async fn find_attendee_by_application(&self, application_id: Uuid) -> AppResult<Option<Attendee>>;

    /// Attendees of the given events, oldest first
    async fn list_attendees_by_events(&self, event_ids: &[Uuid]) -> AppResult<Vec<Attendee>>;

    async fn update_attendee(
        &self,
        id: Uuid,
        expected_version: i32,
        changes: AttendeeChanges,
    ) -> AppResult<Attendee>;
}

/// Everything the services need from storage
pub trait Gateway: UserStore + EventStore + RoleStore + ApplicationStore + AttendeeStore {}

impl<T> Gateway for T where T: UserStore + EventStore + RoleStore + ApplicationStore + AttendeeStore {}

/// Error for a capacity edit that would strand approved attendees
pub(crate) fn capacity_floor(approved: i64) -> AppError {
    AppError::Validation(format!(
        "Capacity cannot drop below the {} approved attendees",
        approved
    ))
}
