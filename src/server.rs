//! HTTP server initialization and runtime setup.
//!
//! Selects the post store, wires services, and runs the Axum server until
//! a shutdown signal arrives.

use crate::application::services::{AuthService, PostService};
use crate::config::Config;
use crate::domain::repositories::PostRepository;
use crate::infrastructure::persistence::{InMemoryPostRepository, PgPostRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL pool and migrations, or the in-memory store
/// - Auth and post services
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = connect_storage(&config).await?;

    let post_service = Arc::new(PostService::new(repository));
    let auth_service = Arc::new(AuthService::new(
        &config.jwt_secret,
        config.jwt_leeway_seconds,
    ));
    let state = AppState::new(post_service, auth_service);

    let app = app_router(state, &config.base_path);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}{}", config.base_path);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Builds the post repository selected by the configuration.
async fn connect_storage(config: &Config) -> Result<Arc<dyn PostRepository>> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("No database configured; posts are kept in memory");
        return Ok(Arc::new(InMemoryPostRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");

    Ok(Arc::new(PgPostRepository::new(Arc::new(pool))))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
