//! Business logic services

pub mod application_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod door_service;
pub mod event_service;
pub mod team_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use application_service::{ApplicationService, Decided};
pub use auth_service::{AuthService, Claims, TokenPair};
pub use dashboard_service::{Dashboard, DashboardEvent, DashboardService};
pub use door_service::DoorService;
pub use event_service::{EventDetails, EventService};
pub use team_service::TeamService;
pub use user_service::UserService;
