//! Key/value settings, exports and the audit trail.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use agency_auth::rbac::{Permission, RbacEnforcer};
use agency_core::error::AppError;
use agency_database::DatabasePool;
use agency_database::repositories::{ActivityRepository, BookingRepository, SettingRepository};
use agency_entity::activity::{ActivityLog, NewActivity};

use super::export::{ExportFile, ExportFormat, render};
use crate::context::RequestContext;

/// Default and maximum number of activity entries returned.
const DEFAULT_ACTIVITY_LIMIT: i64 = 100;
const MAX_ACTIVITY_LIMIT: i64 = 1000;

/// System settings administration.
#[derive(Debug, Clone)]
pub struct SettingsService {
    db: DatabasePool,
    setting_repo: Arc<SettingRepository>,
    booking_repo: Arc<BookingRepository>,
    activity_repo: Arc<ActivityRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl SettingsService {
    /// Creates a new settings service.
    pub fn new(
        db: DatabasePool,
        setting_repo: Arc<SettingRepository>,
        booking_repo: Arc<BookingRepository>,
        activity_repo: Arc<ActivityRepository>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            db,
            setting_repo,
            booking_repo,
            activity_repo,
            rbac,
        }
    }

    /// Every setting as a key/value map.
    pub async fn get_all(&self) -> Result<BTreeMap<String, String>, AppError> {
        let settings = self.setting_repo.find_all().await?;
        Ok(settings.into_iter().map(|s| (s.key, s.value)).collect())
    }

    /// One setting value.
    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.setting_repo.find(key).await?.map(|s| s.value))
    }

    /// Writes all given settings in one transaction.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        settings: BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::SystemSettings)?;

        if settings.is_empty() {
            return Err(AppError::validation("No settings provided"));
        }
        if settings.keys().any(|k| k.trim().is_empty()) {
            return Err(AppError::validation("Setting keys cannot be blank"));
        }

        let now = Utc::now();
        let mut tx = self.db.begin().await?;
        for (key, value) in &settings {
            self.setting_repo.upsert(&mut tx, key.trim(), value, now).await?;
        }
        let keys: Vec<&String> = settings.keys().collect();
        self.activity_repo
            .record(
                &mut tx,
                &NewActivity::new("settings.update", "system_settings")
                    .by(&ctx.user_id)
                    .details(json!({ "keys": keys })),
            )
            .await?;
        tx.commit().await?;

        info!(user_id = %ctx.user_id, count = settings.len(), "Settings updated");
        self.get_all().await
    }

    /// Exports every booking with its flight details.
    pub async fn export(
        &self,
        ctx: &RequestContext,
        format: ExportFormat,
    ) -> Result<ExportFile, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::SystemSettings)?;

        let rows = self.booking_repo.export_rows().await?;
        let stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let file = render(&rows, format, &stamp)?;

        info!(user_id = %ctx.user_id, rows = rows.len(), file = %file.filename, "Bookings exported");
        Ok(file)
    }

    /// Newest activity entries, optionally for one user.
    pub async fn activity(
        &self,
        ctx: &RequestContext,
        limit: Option<i64>,
        user_id: Option<&str>,
    ) -> Result<Vec<ActivityLog>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::SystemSettings)?;
        let limit = limit
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
            .clamp(1, MAX_ACTIVITY_LIMIT);
        self.activity_repo.recent(limit, user_id).await
    }
}
