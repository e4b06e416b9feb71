//! Start the back office server.

use clap::Args;

use agency_core::config::AppConfig;
use agency_core::error::AppError;
use agency_database::migration::run_migrations;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Skip database migrations on startup
    #[arg(long)]
    pub no_migrate: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }

    println!("Starting agency back office...");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);

    let db = super::connect(&config).await?;

    if !args.no_migrate {
        println!("Running database migrations...");
        run_migrations(db.pool()).await?;
    }

    agency_api::run_server(config, db).await
}
