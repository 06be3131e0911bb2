//! Dashboard service
//!
//! Builds the per-user dashboard: events the user organizes, works the door
//! for or performs at, each with statistics, plus the user's own
//! applications.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::Gateway,
    domain::{
        active_roles, compute_stats, compute_stats_for_events, resolve_role, EventStats,
        ResolvedRole,
    },
    error::AppResult,
    models::{Event, EventApplication, Permission},
};

use super::TeamService;

/// One event on a dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardEvent {
    pub event: Event,
    pub role: ResolvedRole,
    /// Present when the role grants `view_dashboard`
    pub stats: Option<EventStats>,
}

/// Everything shown on a user's dashboard
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    /// Created by the user or held as organizer
    pub organizing: Vec<DashboardEvent>,
    pub security: Vec<DashboardEvent>,
    pub performing: Vec<DashboardEvent>,
    pub applications: Vec<EventApplication>,
}

/// Dashboard service for aggregated views
pub struct DashboardService;

impl DashboardService {
    /// Statistics for one event
    pub async fn event_stats(gw: &dyn Gateway, actor: &str, event_id: Uuid) -> AppResult<EventStats> {
        let (event, _) = TeamService::authorize(gw, actor, event_id, Permission::ViewDashboard).await?;

        let ids = [event_id];
        let (applications, attendees) = futures::try_join!(
            gw.list_applications_by_events(&ids),
            gw.list_attendees_by_events(&ids),
        )?;
        Ok(compute_stats(&event, &applications, &attendees))
    }

    /// Dashboard for `user_email`. Applications and attendees of all the
    /// user's events are loaded in one query each and grouped once.
    /// Two active roles on one event fail with `DataIntegrity`.
    pub async fn overview(gw: &dyn Gateway, user_email: &str) -> AppResult<Dashboard> {
        let history = gw.role_history_for_user(user_email).await?;
        let active = active_roles(&history);

        let mut mine: Vec<(Event, ResolvedRole)> = Vec::new();
        for event in gw.list_events().await? {
            let resolution = resolve_role(user_email, &event, &active)?;
            if resolution.role != ResolvedRole::None {
                mine.push((event, resolution.role));
            }
        }

        let event_ids: Vec<Uuid> = mine.iter().map(|(e, _)| e.id).collect();
        let (applications, attendees) = if event_ids.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            futures::try_join!(
                gw.list_applications_by_events(&event_ids),
                gw.list_attendees_by_events(&event_ids),
            )?
        };
        let events: Vec<Event> = mine.iter().map(|(e, _)| e.clone()).collect();
        let mut stats = compute_stats_for_events(&events, &applications, &attendees);

        let mut dashboard = Dashboard {
            applications: gw.list_applications_by_user(user_email).await?,
            ..Dashboard::default()
        };

        for (event, role) in mine {
            let sees_stats = role.permissions().contains(&Permission::ViewDashboard);
            let entry = DashboardEvent {
                stats: sees_stats.then(|| stats.remove(&event.id).unwrap_or_default()),
                event,
                role,
            };
            match role {
                ResolvedRole::Creator | ResolvedRole::Organizer => dashboard.organizing.push(entry),
                ResolvedRole::Bouncer => dashboard.security.push(entry),
                ResolvedRole::Performer => dashboard.performing.push(entry),
                ResolvedRole::None => {}
            }
        }

        Ok(dashboard)
    }
}
