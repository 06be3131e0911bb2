//! Database module
//!
//! This module handles database connections, migrations, and the entity gateway.

pub mod connection;
pub mod gateway;
pub mod memory;
pub mod repositories;

use sqlx::PgPool;

pub use connection::*;
pub use gateway::{ApplicationStore, AttendeeStore, EventStore, Gateway, RoleStore, UserStore};
pub use memory::MemoryGateway;
pub use repositories::PgGateway;

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
