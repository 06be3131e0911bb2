//! User profile handlers

mod handler;
pub mod request;

pub use handler::*;
pub use request::*;

use axum::{routing::get, Router};

use crate::state::AppState;

/// User routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(handler::get_profile).put(handler::update_profile))
}
