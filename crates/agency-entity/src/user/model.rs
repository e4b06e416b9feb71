//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;
use super::status::UserStatus;

/// A back-office account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: String,
    /// Unique login name (matched case-insensitively).
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Full name shown in the UI.
    pub name: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Phone number (optional).
    pub phone: Option<String>,
    /// User role (RBAC).
    pub role: UserRole,
    /// Account status.
    pub status: UserStatus,
    /// Last successful login time.
    pub last_login: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Full name.
    pub name: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Phone number (optional).
    pub phone: Option<String>,
    /// Assigned role.
    pub role: UserRole,
}

/// Partial update of a user account. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New full name.
    pub name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New status.
    pub status: Option<UserStatus>,
    /// New pre-hashed password.
    pub password_hash: Option<String>,
}
