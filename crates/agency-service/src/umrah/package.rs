//! Umrah package records with and without transport.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::info;

use agency_auth::rbac::{Permission, RbacEnforcer};
use agency_core::error::AppError;
use agency_core::types::pagination::{PageRequest, PageResponse};
use agency_database::DatabasePool;
use agency_database::repositories::{ActivityRepository, UmrahRepository};
use agency_entity::activity::NewActivity;
use agency_entity::umrah::{
    UmrahPaymentInput, UmrahTransportInput, UmrahWithTransport, UmrahWithoutTransport,
};

use crate::context::RequestContext;

/// CRUD over both Umrah record kinds plus instalment payments.
#[derive(Debug, Clone)]
pub struct UmrahService {
    db: DatabasePool,
    umrah_repo: Arc<UmrahRepository>,
    activity_repo: Arc<ActivityRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl UmrahService {
    /// Creates a new Umrah service.
    pub fn new(
        db: DatabasePool,
        umrah_repo: Arc<UmrahRepository>,
        activity_repo: Arc<ActivityRepository>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            db,
            umrah_repo,
            activity_repo,
            rbac,
        }
    }

    // ── With transport ──────────────────────────────────────────────

    pub async fn list_with_transport(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<UmrahWithTransport>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        self.umrah_repo.list_with_transport(&page).await
    }

    pub async fn get_with_transport(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<UmrahWithTransport, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        self.umrah_repo
            .find_with_transport(id)
            .await?
            .ok_or_else(|| AppError::not_found("Umrah record not found"))
    }

    pub async fn create_with_transport(
        &self,
        ctx: &RequestContext,
        input: UmrahTransportInput,
    ) -> Result<UmrahWithTransport, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBookings)?;
        check_traveller(&input.passenger_name, &input.departure_date)?;

        let record = self
            .umrah_repo
            .create_with_transport(&input, &ctx.user_id)
            .await?;
        self.log(ctx, "umrah.create", &record.id).await?;

        info!(user_id = %ctx.user_id, record_id = %record.id, "Umrah record created");
        Ok(record)
    }

    pub async fn update_with_transport(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: UmrahTransportInput,
    ) -> Result<UmrahWithTransport, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBookings)?;
        check_traveller(&input.passenger_name, &input.departure_date)?;

        let record = self
            .umrah_repo
            .update_with_transport(id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("Umrah record not found"))?;
        self.log(ctx, "umrah.update", id).await?;
        Ok(record)
    }

    pub async fn delete_with_transport(&self, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
        self.rbac.require_permission(&ctx.role, Permission::DeleteBookings)?;
        if !self.umrah_repo.delete_with_transport(id).await? {
            return Err(AppError::not_found("Umrah record not found"));
        }
        self.log(ctx, "umrah.delete", id).await?;
        info!(user_id = %ctx.user_id, record_id = %id, "Umrah record deleted");
        Ok(())
    }

    // ── Without transport ───────────────────────────────────────────

    pub async fn list_without_transport(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<UmrahWithoutTransport>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        self.umrah_repo.list_without_transport(&page).await
    }

    pub async fn get_without_transport(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<UmrahWithoutTransport, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        self.umrah_repo
            .find_without_transport(id)
            .await?
            .ok_or_else(|| AppError::not_found("Umrah record not found"))
    }

    /// Creates a payment-tracked record; the remaining amount is derived.
    pub async fn create_without_transport(
        &self,
        ctx: &RequestContext,
        input: UmrahPaymentInput,
    ) -> Result<UmrahWithoutTransport, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBookings)?;
        check_traveller(&input.passenger_name, &input.departure_date)?;
        input.check_amounts()?;

        let record = self
            .umrah_repo
            .create_without_transport(&input, &ctx.user_id)
            .await?;
        self.log(ctx, "umrah.create", &record.id).await?;

        info!(
            user_id = %ctx.user_id,
            record_id = %record.id,
            remaining = record.remaining_amount,
            "Umrah payment record created"
        );
        Ok(record)
    }

    pub async fn update_without_transport(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: UmrahPaymentInput,
    ) -> Result<UmrahWithoutTransport, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBookings)?;
        check_traveller(&input.passenger_name, &input.departure_date)?;
        input.check_amounts()?;

        let record = self
            .umrah_repo
            .update_without_transport(id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("Umrah record not found"))?;
        self.log(ctx, "umrah.update", id).await?;
        Ok(record)
    }

    pub async fn delete_without_transport(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<(), AppError> {
        self.rbac.require_permission(&ctx.role, Permission::DeleteBookings)?;
        if !self.umrah_repo.delete_without_transport(id).await? {
            return Err(AppError::not_found("Umrah record not found"));
        }
        self.log(ctx, "umrah.delete", id).await?;
        info!(user_id = %ctx.user_id, record_id = %id, "Umrah payment record deleted");
        Ok(())
    }

    /// Records an instalment. `payment_date` defaults to today (UTC).
    pub async fn record_payment(
        &self,
        ctx: &RequestContext,
        id: &str,
        amount: i64,
        payment_date: Option<String>,
    ) -> Result<UmrahWithoutTransport, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBookings)?;

        let payment_date = match payment_date {
            Some(date) => {
                parse_date(&date, "Payment date")?;
                date
            }
            None => Utc::now().format("%Y-%m-%d").to_string(),
        };

        let mut tx = self.db.begin().await?;
        let record = self
            .umrah_repo
            .find_without_transport_in(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Umrah record not found"))?;
        let (paid, remaining) = record.apply_payment(amount)?;

        let updated = self
            .umrah_repo
            .record_payment(&mut tx, id, paid, remaining, &payment_date)
            .await?;
        self.activity_repo
            .record(
                &mut tx,
                &NewActivity::new("umrah.payment", "umrah_without_transport")
                    .by(&ctx.user_id)
                    .entity(id)
                    .details(json!({ "amount": amount, "remaining": remaining })),
            )
            .await?;
        tx.commit().await?;

        info!(user_id = %ctx.user_id, record_id = %id, amount, remaining, "Umrah payment recorded");
        Ok(updated)
    }

    async fn log(&self, ctx: &RequestContext, action: &str, id: &str) -> Result<(), AppError> {
        self.activity_repo
            .log(&NewActivity::new(action, "umrah").by(&ctx.user_id).entity(id))
            .await
    }
}

fn check_traveller(passenger_name: &str, departure_date: &str) -> Result<(), AppError> {
    if passenger_name.trim().is_empty() {
        return Err(AppError::validation("Passenger name is required"));
    }
    parse_date(departure_date, "Departure date")
}

pub(crate) fn parse_date(value: &str, field: &str) -> Result<(), AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::validation(format!("{field} must be a YYYY-MM-DD date")))
}
