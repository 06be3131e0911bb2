//! Dashboard handler implementations

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    services::{Dashboard, DashboardService},
    state::AppState,
};

/// Events the caller works on, with statistics, and their own applications
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<Dashboard>> {
    let dashboard = DashboardService::overview(state.gateway(), &auth_user.email).await?;
    Ok(Json(dashboard))
}
