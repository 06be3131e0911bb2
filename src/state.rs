//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::{config::Config, db::Gateway, verification::CodeIssuer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Database connection pool, kept for health checks
    db: PgPool,

    /// Redis connection manager
    redis: ConnectionManager,

    /// Storage used by the services
    gateway: Arc<dyn Gateway>,

    /// Phone verification codes
    issuer: Arc<dyn CodeIssuer>,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(
        db: PgPool,
        redis: ConnectionManager,
        gateway: Arc<dyn Gateway>,
        issuer: Arc<dyn CodeIssuer>,
        config: Config,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                redis,
                gateway,
                issuer,
                config,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a clone of the Redis connection manager
    pub fn redis(&self) -> ConnectionManager {
        self.inner.redis.clone()
    }

    /// Storage behind the services
    pub fn gateway(&self) -> &dyn Gateway {
        self.inner.gateway.as_ref()
    }

    pub fn issuer(&self) -> &dyn CodeIssuer {
        self.inner.issuer.as_ref()
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
