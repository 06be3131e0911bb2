//! Guestlist - Application Entry Point

use std::{net::SocketAddr, sync::Arc};

use axum::{middleware, Router};
use redis::Client as RedisClient;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use guestlist::{
    config::CONFIG,
    constants::API_BASE_PATH,
    db::{self, Gateway, PgGateway},
    handlers,
    middleware::{logging_middleware, rate_limit_middleware},
    state::AppState,
    verification::{CodeIssuer, CodeSender, LogCodeSender, RedisCodeIssuer, WebhookCodeSender},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Guestlist server...");

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&CONFIG.database).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool).await?;

    // Initialize Redis connection
    tracing::info!("Connecting to Redis...");
    let redis_client = RedisClient::open(CONFIG.redis.url.as_str())?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client).await?;

    // Verification codes go out over the SMS webhook when one is configured
    let sender: Arc<dyn CodeSender> = match &CONFIG.verification.sms_webhook_url {
        Some(url) => Arc::new(WebhookCodeSender::new(url.clone())),
        None => {
            tracing::warn!("SMS_WEBHOOK_URL not set; verification codes will only be logged");
            Arc::new(LogCodeSender)
        }
    };
    let issuer: Arc<dyn CodeIssuer> = Arc::new(RedisCodeIssuer::new(
        redis_conn.clone(),
        sender,
        CONFIG.verification.clone(),
    ));
    let gateway: Arc<dyn Gateway> = Arc::new(PgGateway::new(db_pool.clone()));

    // Create application state
    let state = AppState::new(db_pool, redis_conn, gateway, issuer, CONFIG.clone());

    // Build the router
    let app = Router::new()
        .nest(API_BASE_PATH, handlers::routes(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
