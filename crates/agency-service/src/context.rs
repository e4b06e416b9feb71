//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agency_entity::user::{User, UserRole};

/// Context for the current authenticated request.
///
/// Built by the API auth extractor and passed into service methods so
/// that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: String,
    /// The username.
    pub username: String,
    /// The user's current role.
    pub role: UserRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role,
            request_time: Utc::now(),
        }
    }

    /// Context for a loaded user.
    pub fn for_user(user: &User) -> Self {
        Self::new(user.id.clone(), user.username.clone(), user.role)
    }

    /// Context for maintenance work run outside any request (CLI, sweeper).
    pub fn system() -> Self {
        Self::new("system", "system", UserRole::Admin)
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
