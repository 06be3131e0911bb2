//! Guestlist - Invite-Only Event Management
//!
//! Backend for events that are open by application only. Organizers
//! publish an event, guests apply and confirm their phone with a one-time
//! code, the team screens the applications, and bouncers check approved
//! attendees in at the door.
//!
//! # Features
//!
//! - Per-event team roles (organizer, bouncer, performer) resolved to permissions
//! - Application review workflow with capacity enforcement
//! - Phone verification codes with attempt limits and resend cooldown
//! - Door check-in, flags and notes
//! - Dashboards with per-event statistics
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic
//! - **Domain**: Pure rules (role resolution, review state machine, statistics)
//! - **Db**: Storage gateway with Postgres and in-memory implementations
//! - **Models**: Domain models

pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod verification;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
