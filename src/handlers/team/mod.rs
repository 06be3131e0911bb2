//! Event team handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, put},
    Router,
};

use crate::state::AppState;

/// Team routes, mounted under `/events`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/team", get(handler::list_team).post(handler::assign_role))
        .route("/{id}/team/history", get(handler::role_history))
        .route(
            "/{id}/team/{email}",
            put(handler::change_role).delete(handler::revoke_role),
        )
}
