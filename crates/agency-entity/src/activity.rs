//! Append-only audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One recorded user action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    pub id: String,
    pub user_id: Option<String>,
    /// Dotted action name, e.g. `batch.create`.
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    /// Free-form details, JSON in practice.
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An activity entry about to be written.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Option<String>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl NewActivity {
    /// Start an entry for `action` on an entity type.
    pub fn new(action: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            user_id: None,
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: None,
            details: None,
        }
    }

    /// Set the acting user.
    pub fn by(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the affected entity.
    pub fn entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Attach structured details.
    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
