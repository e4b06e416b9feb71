//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use agency_api::AppState;
use agency_core::config::AppConfig;
use agency_core::error::AppError;
use agency_core::types::pagination::PageRequest;
use agency_database::repositories::UserRepository;
use agency_entity::user::{UserRole, UserStatus};
use agency_service::user::CreateUserRequest;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create {
        /// Username
        #[arg(short, long)]
        username: Option<String>,
        /// Full name
        #[arg(short, long)]
        name: Option<String>,
        /// Role: admin, manager or staff
        #[arg(short, long, default_value = "staff")]
        role: String,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// List all users
    List,
    /// Enable a user
    Enable {
        /// Username
        username: String,
    },
    /// Disable a user
    Disable {
        /// Username
        username: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    username: String,
    name: String,
    role: String,
    status: String,
    last_login: String,
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let user_repo = UserRepository::new(db.pool().clone());

    match &args.command {
        UserCommand::Create {
            username,
            name,
            role,
            password,
        } => {
            let role: UserRole = role.parse()?;
            let username = match username {
                Some(u) => u.clone(),
                None => prompt("Username")?,
            };
            let name = match name {
                Some(n) => n.clone(),
                None => prompt("Full name")?,
            };
            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };

            let state = AppState::new(config.clone(), db.clone());
            let user = state
                .user_service
                .insert(CreateUserRequest {
                    username,
                    password,
                    name,
                    email: None,
                    phone: None,
                    role,
                })
                .await?;

            output::print_success(&format!("User '{}' created", user.username));
            output::print_kv("ID", &user.id);
            output::print_kv("Role", &user.role.to_string());
        }
        UserCommand::List => {
            let users = user_repo.find_all(&PageRequest::new(Some(100), None)).await?;
            let rows: Vec<UserRow> = users
                .items
                .iter()
                .map(|u| UserRow {
                    id: u.id.clone(),
                    username: u.username.clone(),
                    name: u.name.clone(),
                    role: u.role.to_string(),
                    status: u.status.to_string(),
                    last_login: u
                        .last_login
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                })
                .collect();

            output::print_list(&rows, format);
        }
        UserCommand::Enable { username } => {
            set_status(&user_repo, username, UserStatus::Active).await?;
            output::print_success(&format!("User '{username}' enabled"));
        }
        UserCommand::Disable { username } => {
            set_status(&user_repo, username, UserStatus::Inactive).await?;
            output::print_success(&format!("User '{username}' disabled"));
        }
    }

    db.close().await;
    Ok(())
}

fn prompt(label: &str) -> Result<String, AppError> {
    dialoguer::Input::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

async fn set_status(
    user_repo: &UserRepository,
    username: &str,
    status: UserStatus,
) -> Result<(), AppError> {
    let user = user_repo
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;
    user_repo.set_status(&user.id, status).await?;
    Ok(())
}
