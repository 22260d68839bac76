//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, service wiring, and Axum server lifecycle.

use crate::application::services::{AccountService, AuthService, CategoryService, OAuthService};
use crate::config::Config;
use crate::infrastructure::persistence::{
    PgAccountRepository, PgCategoryRepository, PgConsumerRepository, PgRoleRepository,
    PgSessionRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Repositories and services
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.connect_timeout)
        .idle_timeout(config.database.idle_timeout)
        .max_lifetime(config.database.max_lifetime)
        .connect(config.database.url.as_str())
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let state = build_state(Arc::new(pool), &config);
    let app = app_router(state, config.behind_proxy);

    let addr = config.listen_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wires PostgreSQL repositories into the application services.
pub fn build_state(pool: Arc<PgPool>, config: &Config) -> AppState {
    let account_repository = Arc::new(PgAccountRepository::new(pool.clone()));
    let role_repository = Arc::new(PgRoleRepository::new(pool.clone()));
    let category_repository = Arc::new(PgCategoryRepository::new(pool.clone()));
    let consumer_repository = Arc::new(PgConsumerRepository::new(pool.clone()));
    let session_repository = Arc::new(PgSessionRepository::new(pool));

    AppState::new(
        Arc::new(AccountService::new(
            account_repository.clone(),
            role_repository,
            config.registration_mode,
        )),
        Arc::new(CategoryService::new(category_repository)),
        Arc::new(AuthService::new(
            session_repository,
            account_repository,
            config.token_signing_secret.clone(),
        )),
        Arc::new(OAuthService::new(
            consumer_repository,
            config.oauth.context.clone(),
            config.oauth.timestamp_window,
            config.oauth.public_base_url.clone(),
        )),
    )
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
