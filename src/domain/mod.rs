//! Domain rules
//!
//! Pure functions behind the service layer: role resolution, the
//! application review state machine and dashboard statistics. Nothing in
//! here touches storage.

pub mod access;
pub mod review;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

pub use access::{
    active_roles, address_visible, has_permission, require_permission, resolve_role, ResolvedRole,
    RoleResolution,
};
pub use review::CheckInPlan;
pub use stats::{compute_stats, compute_stats_for_events, EventStats};
