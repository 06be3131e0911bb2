//! Event handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Event routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_events).post(handler::create_event))
        .route("/{id}", get(handler::get_event).put(handler::update_event))
        .route("/{id}/status", post(handler::change_status))
        .route("/{id}/stats", get(handler::get_stats))
        .route("/{id}/attendees", get(handler::list_attendees))
        .route(
            "/{id}/applications",
            get(handler::list_applications).post(handler::submit_application),
        )
}
