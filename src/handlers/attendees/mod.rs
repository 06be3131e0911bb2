//! Door handlers

mod handler;
pub mod request;

pub use handler::*;
pub use request::*;

use axum::{routing::post, Router};

use crate::state::AppState;

/// Attendee routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/check-in", post(handler::check_in))
        .route("/{id}/flag", post(handler::flag))
        .route("/{id}/notes", post(handler::add_note))
}
