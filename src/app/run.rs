use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;

use crate::{
    app,
    error::AppError,
    repositories::{
        comments::PgCommentRepository, related::PgRelatedEntityRepository,
        reports::PgReportRepository, users::PgUserRepository,
    },
    services::{
        config::{ConfigCache, ConfigSource, FileConfigSource, StaticConfigSource},
        content_filter::WordListFilter,
        email::EmailService,
        maintenance,
        notifier::EmailNotifier,
    },
    telemetry,
    usecases::context::WorkflowContext,
};

pub async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing()
        .map_err(|err| AppError::Internal(format!("telemetry init failed: {}", err)))?;

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|err| AppError::Internal(format!("DATABASE_URL missing: {}", err)))?;
    let max_connections = read_env_u32("DATABASE_MAX_CONNECTIONS").unwrap_or(20);
    let min_connections = read_env_u32("DATABASE_MIN_CONNECTIONS").unwrap_or(5);
    let acquire_timeout_secs = read_env_u64("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(15);
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
        .connect(&database_url)
        .await
        .map_err(AppError::Database)?;

    let config_source: Arc<dyn ConfigSource> = match std::env::var("COMMENTS_CONFIG_PATH") {
        Ok(path) => Arc::new(FileConfigSource::new(path)),
        Err(_) => {
            tracing::info!("COMMENTS_CONFIG_PATH not set, using default comments config");
            Arc::new(StaticConfigSource::default())
        }
    };
    let config = Arc::new(ConfigCache::load(config_source).await?);
    maintenance::spawn_config_refresh(
        config.clone(),
        read_env_u64("COMMENTS_CONFIG_REFRESH_SECS").unwrap_or(60),
    );

    let email = match EmailService::from_env() {
        Ok(service) => Some(service),
        Err(message) => {
            tracing::warn!("Email service not configured: {}", message);
            None
        }
    };
    let redis = match std::env::var("REDIS_URL") {
        Ok(url) => match redis::Client::open(url) {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::warn!("Invalid REDIS_URL, report rate limiting disabled: {}", err);
                None
            }
        },
        Err(_) => None,
    };

    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let ctx = WorkflowContext {
        comments: Arc::new(PgCommentRepository::new(pool.clone())),
        related: Arc::new(PgRelatedEntityRepository::new(pool.clone())),
        reports: Arc::new(PgReportRepository::new(pool.clone())),
        profiles: users.clone(),
        filter: Arc::new(WordListFilter::from_env()),
        config: config.clone(),
        notifier: Arc::new(EmailNotifier::new(email, users, config)),
    };

    let state = app::state::AppState::new(ctx, redis);
    let app = app::router::build_router(state);

    let port = read_env_u32("PORT").and_then(|port| u16::try_from(port).ok()).unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Internal(format!("bind failed: {}", err)))?;
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|err| AppError::Internal(format!("server error: {}", err)));
    telemetry::shutdown_tracing();
    result?;
    Ok(())
}

fn read_env_u32(key: &str) -> Option<u32> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
}

fn read_env_u64(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
}
