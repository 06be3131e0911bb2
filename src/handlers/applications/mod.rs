//! Application review handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

/// Application routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mine", get(handler::my_applications))
        .route("/{id}", delete(handler::withdraw))
        .route("/{id}/verify", post(handler::verify))
        .route("/{id}/resend", post(handler::resend_code))
        .route("/{id}/decision", post(handler::decide))
}
