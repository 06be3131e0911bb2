//! Database repositories
//!
//! PostgreSQL implementation of the entity gateway. Each file implements
//! one store trait on [`PgGateway`] and owns the row type for its table.

pub mod application_repo;
pub mod attendee_repo;
pub mod event_repo;
pub mod role_repo;
pub mod user_repo;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Gateway backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Work out why a versioned `UPDATE ... WHERE id = $1 AND version = $2` matched nothing
    async fn missing_or_stale(&self, table: &str, kind: &str, id: Uuid) -> AppError {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
        match sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
        {
            Ok(true) => AppError::Conflict(format!("{} {} was modified concurrently", kind, id)),
            Ok(false) => AppError::NotFound(format!("{} not found", kind)),
            Err(e) => e.into(),
        }
    }
}

/// Parse a stored enum column, treating unknown values as corrupt data
fn parse_column<T>(column: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, AppError> {
    parse(value).ok_or_else(|| {
        AppError::DataIntegrity(format!("unexpected value {:?} in column {}", value, column))
    })
}

/// Run against a scratch database:
/// `DATABASE_URL=postgres://... cargo test -- --ignored`
#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::{run_migrations, ApplicationStore, EventStore, UserStore};
    use crate::models::{
        ApplicationStatus, EventChanges, EventStatus, NewApplication, NewEvent, NewUser, Review,
    };

    async fn gateway() -> PgGateway {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.expect("database reachable");
        run_migrations(&pool).await.expect("migrations apply");
        PgGateway::new(pool)
    }

    async fn user(gw: &PgGateway, tag: &str) -> String {
        let email = format!("{}-{}@example.com", tag, Uuid::new_v4());
        gw.create_user(NewUser {
            email: email.clone(),
            full_name: tag.to_string(),
            phone: None,
            password_hash: "unused".to_string(),
        })
        .await
        .unwrap();
        email
    }

    fn approval(by: &str) -> Review {
        Review {
            status: ApplicationStatus::Approved,
            reviewed_by: by.to_string(),
            reviewed_at: Utc::now(),
        }
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_pg_capacity_is_read_under_event_lock() {
        let gw = gateway().await;
        let host = user(&gw, "host").await;
        let event = gw
            .create_event(NewEvent {
                name: "Basement".to_string(),
                description: None,
                date: Utc::now(),
                location_name: "Somewhere".to_string(),
                location_address: "1 Secret Lane".to_string(),
                capacity: 2,
                guest_passes_per_attendee: 1,
                genres: vec!["techno".to_string()],
                status: EventStatus::Published,
                created_by: host.clone(),
                screening_required: true,
            })
            .await
            .unwrap();

        let mut applications = Vec::new();
        for tag in ["a", "b", "c"] {
            let email = user(&gw, tag).await;
            let application = gw
                .create_application(NewApplication {
                    event_id: event.id,
                    user_email: email,
                    application_message: "hello".to_string(),
                    guests_requested: 0,
                })
                .await
                .unwrap();
            applications.push(application);
        }

        let first = gw
            .record_review(applications[0].id, 1, approval(&host), true)
            .await
            .unwrap();
        assert_eq!(first.status, ApplicationStatus::Approved);
        assert_eq!(first.version, 2);

        let shrink = EventChanges { capacity: Some(1), ..Default::default() };
        let event = gw.update_event(event.id, event.version, shrink).await.unwrap();
        assert_eq!(event.capacity, 1);

        let over = gw.record_review(applications[1].id, 1, approval(&host), true).await;
        assert!(matches!(over, Err(AppError::CapacityExceeded { capacity: 1 })));
        assert_eq!(gw.count_approved(event.id).await.unwrap(), 1);

        let below = EventChanges { capacity: Some(0), ..Default::default() };
        let floor = gw.update_event(event.id, event.version, below).await;
        assert!(matches!(floor, Err(AppError::Validation(_))));

        let stale = gw.record_review(applications[2].id, 7, approval(&host), false).await;
        assert!(matches!(stale, Err(AppError::Conflict(_))));

        let missing = gw.record_review(Uuid::new_v4(), 1, approval(&host), true).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
