//! planning-poker server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use planning_poker::app_state::AppState;
use planning_poker::config::{LogFormat, PokerConfig};
use planning_poker::persistence::{MemoryRoomStore, PostgresRoomStore, RoomStore};
use planning_poker::repository::RoomRepository;
use planning_poker::service::SessionService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = PokerConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting planning-poker");

    let shutdown = CancellationToken::new();

    // Build storage layer
    let store: Arc<dyn RoomStore> = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("failed to connect to PostgreSQL")?;
        let store = Arc::new(PostgresRoomStore::new(pool));
        store.migrate().await?;
        tokio::spawn(purge_expired_rooms(
            Arc::clone(&store),
            Duration::from_secs(config.room_cleanup_interval_secs.max(1)),
            shutdown.clone(),
        ));
        tracing::info!("persistence enabled (PostgreSQL)");
        store as Arc<dyn RoomStore>
    } else {
        tracing::info!("persistence disabled, rooms are kept in memory");
        Arc::new(MemoryRoomStore::new())
    };

    // Build repository and service layer
    let repository = Arc::new(RoomRepository::with_ttl(store, config.room_ttl()));
    let session_service = Arc::new(SessionService::new(repository, config.change_stream()));

    // Build application state and router
    let app_state = AppState {
        session_service,
        shutdown: shutdown.clone(),
    };
    let app = planning_poker::build_app(app_state, config.static_dir.clone());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C and cancels every connection.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown requested");
    shutdown.cancel();
}

/// Periodically deletes rooms past their expiry hint.
async fn purge_expired_rooms(
    store: Arc<PostgresRoomStore>,
    every: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }
        match store.purge_expired().await {
            Ok(0) => {}
            Ok(purged) => tracing::info!(purged, "expired rooms purged"),
            Err(err) => tracing::warn!(error = %err, "room purge failed"),
        }
    }
}
