//! Fixtures for service tests running against the in-memory gateway

use chrono::{Duration, Utc};

use crate::{
    db::{EventStore, Gateway, MemoryGateway},
    models::{Decision, Event, EventApplication, EventStatus, NewEvent, NewUser, User},
    verification::memory::testing::{capturing_issuer, Outbox},
    verification::MemoryCodeIssuer,
};

use super::ApplicationService;

pub const HOST: &str = "host@example.com";

/// Event input as the creation form fills it in
pub fn event_input(creator: &str) -> NewEvent {
    NewEvent {
        name: "Warehouse 12".to_string(),
        description: Some("All night".to_string()),
        date: Utc::now() + Duration::days(7),
        location_name: "Dock Street".to_string(),
        location_address: "12 Dock Street, Unit 4".to_string(),
        capacity: 50,
        guest_passes_per_attendee: 1,
        genres: vec!["techno".to_string()],
        status: EventStatus::Published,
        created_by: creator.to_string(),
        screening_required: true,
    }
}

pub async fn create_event(gw: &MemoryGateway, creator: &str) -> Event {
    gw.create_event(event_input(creator)).await.unwrap()
}

pub async fn create_event_with(gw: &MemoryGateway, input: NewEvent) -> Event {
    gw.create_event(input).await.unwrap()
}

/// Register a user; applicants get a phone number derived from their email
pub async fn register(gw: &dyn Gateway, email: &str) -> User {
    gw.create_user(NewUser {
        email: email.to_string(),
        full_name: email.split('@').next().unwrap_or_default().to_string(),
        phone: Some(phone_of(email)),
        password_hash: String::new(),
    })
    .await
    .unwrap()
}

pub fn phone_of(email: &str) -> String {
    let digits: u32 = email.bytes().map(u32::from).sum();
    format!("+1555{:07}", digits)
}

/// Gateway plus issuer whose codes the test can read back
pub struct Harness {
    pub gw: MemoryGateway,
    pub issuer: MemoryCodeIssuer,
    pub outbox: Outbox,
}

impl Harness {
    pub fn new() -> Self {
        let (issuer, outbox) = capturing_issuer();
        Self {
            gw: MemoryGateway::new(),
            issuer,
            outbox,
        }
    }

    /// Register `email` and take it through submission and verification
    pub async fn verified_application(&self, event: &Event, email: &str) -> EventApplication {
        register(&self.gw, email).await;
        let (application, _) =
            ApplicationService::submit(&self.gw, &self.issuer, email, event.id, "Regular", 0)
                .await
                .unwrap();
        let code = self.outbox.last_code(&phone_of(email)).unwrap();
        ApplicationService::verify(&self.gw, &self.issuer, email, application.id, &code)
            .await
            .unwrap()
    }

    /// A verified application approved by the event creator
    pub async fn approved_application(&self, event: &Event, email: &str) -> EventApplication {
        let application = self.verified_application(event, email).await;
        ApplicationService::decide(
            &self.gw,
            &event.created_by,
            application.id,
            Decision::Approve,
            None,
        )
        .await
        .unwrap()
        .application
    }
}
