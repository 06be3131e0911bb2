//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod applications;
pub mod attendees;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod health;
pub mod team;
pub mod users;

use axum::{middleware, Router};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// Create all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/users", users::routes())
        .nest("/events", events::routes().merge(team::routes()))
        .nest("/applications", applications::routes())
        .nest("/attendees", attendees::routes())
        .nest("/dashboard", dashboard::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(health::routes())
        .nest("/auth", auth::routes(state))
        .merge(protected)
}
