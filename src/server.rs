//! HTTP server initialization and runtime setup.
//!
//! Handles storage setup, worker spawning, and Axum server lifecycle.

use crate::api::middleware::rate_limit;
use crate::config::{Config, StorageBackend};
use crate::domain::click_worker::run_click_worker;
use crate::infrastructure::Storage;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Opens a PostgreSQL pool with the configured limits and applies migrations.
///
/// # Errors
///
/// Returns an error if the URL is missing, the connection fails, or a
/// migration cannot be applied.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres storage backend")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    Ok(pool)
}

/// Builds repositories for the configured backend.
pub async fn build_storage(config: &Config) -> Result<Storage> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_database(config).await?;
            Ok(Storage::postgres(Arc::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage: data is lost on restart");
            Ok(Storage::memory())
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL pool and migrations, or in-memory store)
/// - Background click worker
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, then the
/// click queue is closed and drained before returning.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let storage = build_storage(&config).await?;

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);

    let worker = tokio::spawn(run_click_worker(
        click_rx,
        storage.clicks.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.click_worker_concurrency,
        "Click worker started"
    );

    let state = AppState::new(&storage, click_tx, config.behind_proxy);

    let rate_limit = if config.rate_limit_enabled {
        Some(rate_limit::layer(
            config.rate_limit_per_second,
            config.rate_limit_burst,
        )?)
    } else {
        None
    };

    let app = app_router(state, rate_limit);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router (and with it the last click sender) is dropped once serve
    // returns, so the worker sees a closed channel and drains what is left.
    tracing::info!("Server stopped, draining click queue");
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Click worker panicked");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
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
