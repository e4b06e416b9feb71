//! Countries and airlines.

use std::sync::Arc;

use tracing::info;

use agency_auth::rbac::{Permission, RbacEnforcer};
use agency_core::error::AppError;
use agency_database::repositories::ReferenceRepository;
use agency_entity::reference::{Airline, Country};

use crate::context::RequestContext;

/// Lookup tables shared by the inventory screens.
#[derive(Debug, Clone)]
pub struct ReferenceService {
    reference_repo: Arc<ReferenceRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl ReferenceService {
    /// Creates a new reference service.
    pub fn new(reference_repo: Arc<ReferenceRepository>, rbac: Arc<RbacEnforcer>) -> Self {
        Self {
            reference_repo,
            rbac,
        }
    }

    pub async fn countries(&self) -> Result<Vec<Country>, AppError> {
        self.reference_repo.list_countries().await
    }

    pub async fn airlines(&self) -> Result<Vec<Airline>, AppError> {
        self.reference_repo.list_airlines().await
    }

    /// Registers an airline. Without a code, one is derived from the name.
    pub async fn create_airline(
        &self,
        ctx: &RequestContext,
        name: &str,
        code: Option<&str>,
    ) -> Result<Airline, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBatches)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Airline name is required"));
        }
        let code = match code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => code.to_string(),
            None => Airline::fallback_code(name),
        };

        let airline = self.reference_repo.create_airline(name, &code).await?;
        info!(user_id = %ctx.user_id, airline = %airline.name, code = %airline.code, "Airline created");
        Ok(airline)
    }
}
