//! CLI command definitions and dispatch.

pub mod migrate;
pub mod serve;
pub mod sweep;
pub mod user;

use clap::{Parser, Subcommand};

use agency_core::config::AppConfig;
use agency_core::error::AppError;
use agency_database::DatabasePool;

use crate::output::OutputFormat;

/// Travel agency back office administration
#[derive(Debug, Parser)]
#[command(name = "agency", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and the environment overlays
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,

    /// Configuration environment overlay
    #[arg(short, long, env = "AGENCY_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User management
    User(user::UserArgs),
    /// Release expired holds once and exit
    Sweep,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config_dir, &self.env)?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Sweep => sweep::execute(&config).await,
        }
    }
}

/// Helper: connect to the configured database
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}
