//! Travel agency back office server.
//!
//! Main entry point: loads configuration, prepares the database and starts
//! the HTTP API.

use std::path::Path;

use tracing_subscriber::{EnvFilter, fmt};

use agency_core::config::AppConfig;
use agency_core::error::AppError;
use agency_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `AGENCY_ENV` overlay and `AGENCY__*`
/// environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("AGENCY_ENV").unwrap_or_else(|_| "development".to_string());
    let dir = std::env::var("AGENCY_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting agency back office v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Data directory ───────────────────────────────────
    create_data_directory(&config.database.url).await?;

    // ── Step 2: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    agency_database::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 3: HTTP server and sweeper ──────────────────────────
    agency_api::run_server(config, db).await
}

/// Create the directory holding a file-backed SQLite database.
async fn create_data_directory(url: &str) -> Result<(), AppError> {
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if path.starts_with(':') || path.is_empty() {
        return Ok(());
    }
    let path = path.split('?').next().unwrap_or(path);

    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::internal(format!("Failed to create dir '{}': {e}", dir.display()))
        })?;
    }
    Ok(())
}
