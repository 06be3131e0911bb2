//! Dashboard handlers

mod handler;

pub use handler::*;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Dashboard routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(handler::get_dashboard))
}
