//! Application builder: wires router, middleware and state into an Axum app
//! and runs the server with its background sweeper.

use std::time::Duration;

use axum::Router;
use tokio::sync::watch;

use agency_core::config::AppConfig;
use agency_core::error::AppError;
use agency_database::DatabasePool;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the back-office server on an already migrated database.
pub async fn run_server(config: AppConfig, db: DatabasePool) -> Result<(), AppError> {
    tracing::info!("Starting agency back-office server...");

    // ── Step 1: Wire services ────────────────────────────────────
    let state = AppState::new(config.clone(), db.clone());

    // ── Step 2: Bootstrap the first admin account ────────────────
    if let Some(password) = config.auth.initial_admin_password.as_deref() {
        if let Some(admin) = state.user_service.ensure_initial_admin(password).await? {
            tracing::warn!(
                username = %admin.username,
                "Created initial admin account; change its password"
            );
        }
    }

    // ── Step 3: Shutdown channel & expiry sweeper ────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper_handle = if config.maintenance.enabled {
        let sweeper = state.sweeper.clone();
        let interval = Duration::from_secs(config.maintenance.sweep_interval_seconds.max(1));
        Some(tokio::spawn(async move {
            sweeper.run(interval, shutdown_rx).await;
        }))
    } else {
        tracing::info!("Expiry sweeper disabled");
        None
    };

    // ── Step 4: Build and start HTTP server ──────────────────────
    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(address = %addr, "Agency server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Drain background work ────────────────────────────
    if let Some(handle) = sweeper_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Expiry sweeper task failed");
        }
    }
    db.close().await;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
