//! Ticket batch intake and maintenance.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use agency_auth::rbac::{Permission, RbacEnforcer};
use agency_core::error::AppError;
use agency_core::types::pagination::{PageRequest, PageResponse};
use agency_database::DatabasePool;
use agency_database::repositories::{
    ActivityRepository, BatchRepository, ReferenceRepository, TicketRepository,
};
use agency_entity::activity::NewActivity;
use agency_entity::batch::{BatchSummary, CreateBatch, MAX_BATCH_QUANTITY, TicketBatch, UpdateBatch};
use agency_entity::reference::Airline;
use agency_entity::ticket::{NewTicket, Ticket};

use crate::context::RequestContext;
use crate::financial::{FinancialService, check_amount};

/// Seat class given to tickets created by intake.
const DEFAULT_SEAT_CLASS: &str = "economy";

/// Result of recording a purchase.
#[derive(Debug, Clone, Serialize)]
pub struct BatchCreated {
    pub batch: TicketBatch,
    pub tickets_created: u64,
    /// Selling price given to every ticket of the batch.
    pub selling_price: i64,
}

/// A batch with its counts and its tickets.
#[derive(Debug, Clone, Serialize)]
pub struct BatchDetail {
    #[serde(flatten)]
    pub summary: BatchSummary,
    pub tickets: Vec<Ticket>,
}

/// Records wholesale purchases and expands them into tickets.
#[derive(Debug, Clone)]
pub struct BatchService {
    db: DatabasePool,
    batch_repo: Arc<BatchRepository>,
    ticket_repo: Arc<TicketRepository>,
    reference_repo: Arc<ReferenceRepository>,
    activity_repo: Arc<ActivityRepository>,
    financial: Arc<FinancialService>,
    rbac: Arc<RbacEnforcer>,
}

impl BatchService {
    /// Creates a new batch service.
    pub fn new(
        db: DatabasePool,
        batch_repo: Arc<BatchRepository>,
        ticket_repo: Arc<TicketRepository>,
        reference_repo: Arc<ReferenceRepository>,
        activity_repo: Arc<ActivityRepository>,
        financial: Arc<FinancialService>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            db,
            batch_repo,
            ticket_repo,
            reference_repo,
            activity_repo,
            financial,
            rbac,
        }
    }

    /// Records a purchase of `quantity` seats.
    ///
    /// The batch row, every ticket row and the activity entry are written
    /// in one transaction.
    pub async fn create_batch(
        &self,
        ctx: &RequestContext,
        mut req: CreateBatch,
    ) -> Result<BatchCreated, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBatches)?;

        req.country_code = req.country_code.trim().to_uppercase();
        req.airline_name = req.airline_name.trim().to_string();
        req.agent_name = req.agent_name.trim().to_string();
        check_batch(&req)?;

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let country = self
            .reference_repo
            .find_country(&mut tx, &req.country_code)
            .await?
            .ok_or_else(|| {
                AppError::validation(format!("Unknown country '{}'", req.country_code))
            })?;
        req.country_code = country.code;

        let prefix = match self
            .reference_repo
            .find_airline_by_name(&mut tx, &req.airline_name)
            .await?
        {
            Some(airline) => airline.code,
            None => Airline::fallback_code(&req.airline_name),
        };

        let selling_price = self
            .financial
            .optimal_price_in(&mut tx, req.buying_price, &req.country_code)
            .await;

        let batch = self.batch_repo.insert(&mut tx, &req, &ctx.user_id, now).await?;

        let tickets: Vec<NewTicket> = (1..=req.quantity)
            .map(|n| NewTicket {
                batch_id: batch.id.clone(),
                flight_number: format!("{prefix}{n:03}"),
                selling_price,
                aircraft: None,
                seat_class: DEFAULT_SEAT_CLASS.to_string(),
            })
            .collect();
        let tickets_created = self.ticket_repo.insert_many(&mut tx, &tickets, now).await?;

        self.activity_repo
            .record(
                &mut tx,
                &NewActivity::new("batch.create", "ticket_batch")
                    .by(&ctx.user_id)
                    .entity(&batch.id)
                    .details(json!({
                        "airline": batch.airline_name,
                        "country": batch.country_code,
                        "quantity": batch.quantity,
                        "buying_price": batch.buying_price,
                    })),
            )
            .await?;

        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            batch_id = %batch.id,
            country = %batch.country_code,
            quantity = batch.quantity,
            selling_price,
            "Ticket batch created"
        );

        Ok(BatchCreated {
            batch,
            tickets_created,
            selling_price,
        })
    }

    /// Lists batches with their ticket status counts.
    pub async fn list_batches(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<BatchSummary>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewProfit)?;
        self.batch_repo.list_summaries(&page).await
    }

    /// One batch with its tickets.
    pub async fn get_batch(&self, ctx: &RequestContext, id: &str) -> Result<BatchDetail, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewProfit)?;

        let summary = self
            .batch_repo
            .find_summary(id)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket batch not found"))?;
        let tickets = self.ticket_repo.list_by_batch(id).await?;

        Ok(BatchDetail { summary, tickets })
    }

    /// Edits agent and remarks metadata.
    pub async fn update_batch(
        &self,
        ctx: &RequestContext,
        id: &str,
        req: UpdateBatch,
    ) -> Result<TicketBatch, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::EditBatches)?;

        if matches!(&req.agent_name, Some(name) if name.trim().is_empty()) {
            return Err(AppError::validation("Agent name cannot be blank"));
        }

        let batch = self
            .batch_repo
            .update(id, &req)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket batch not found"))?;

        self.activity_repo
            .log(
                &NewActivity::new("batch.update", "ticket_batch")
                    .by(&ctx.user_id)
                    .entity(&batch.id),
            )
            .await?;

        info!(user_id = %ctx.user_id, batch_id = %batch.id, "Ticket batch updated");
        Ok(batch)
    }

    /// Deletes a batch whose tickets are all still available.
    pub async fn delete_batch(&self, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
        self.rbac.require_permission(&ctx.role, Permission::DeleteBatches)?;

        let mut tx = self.db.begin().await?;

        let committed = self.batch_repo.count_committed_tickets(&mut tx, id).await?;
        if committed > 0 {
            return Err(AppError::conflict(format!(
                "Batch has {committed} booked, locked or sold ticket(s)"
            )));
        }
        if !self.batch_repo.delete(&mut tx, id).await? {
            return Err(AppError::not_found("Ticket batch not found"));
        }

        self.activity_repo
            .record(
                &mut tx,
                &NewActivity::new("batch.delete", "ticket_batch")
                    .by(&ctx.user_id)
                    .entity(id),
            )
            .await?;

        tx.commit().await?;

        info!(user_id = %ctx.user_id, batch_id = %id, "Ticket batch deleted");
        Ok(())
    }
}

fn check_batch(req: &CreateBatch) -> Result<(), AppError> {
    if req.country_code.is_empty() {
        return Err(AppError::validation("Country is required"));
    }
    if req.airline_name.is_empty() {
        return Err(AppError::validation("Airline is required"));
    }
    if req.agent_name.is_empty() {
        return Err(AppError::validation("Agent name is required"));
    }
    if req.buying_price <= 0 {
        return Err(AppError::validation("Buying price must be greater than zero"));
    }
    check_amount("Buying price", req.buying_price)?;
    if !(1..=MAX_BATCH_QUANTITY).contains(&req.quantity) {
        return Err(AppError::validation(format!(
            "Quantity must be between 1 and {MAX_BATCH_QUANTITY}"
        )));
    }
    if NaiveDate::parse_from_str(&req.flight_date, "%Y-%m-%d").is_err() {
        return Err(AppError::validation("Flight date must be a YYYY-MM-DD date"));
    }
    Ok(())
}


#[cfg(test)]
mod service_tests {
    use super::*;
    use agency_core::error::ErrorKind;
    use agency_entity::booking::PaymentType;
    use agency_entity::ticket::TicketStatus;
    use agency_entity::user::UserRole;

    use crate::test_support::{Fixture, booking_request, ksa_batch};

    #[tokio::test]
    async fn test_create_batch_expands_tickets() {
        let fx = Fixture::new().await;
        let admin = fx.login_as("admin1", UserRole::Admin).await;

        let created = fx.batches.create_batch(&admin, ksa_batch(3)).await.unwrap();
        assert_eq!(created.tickets_created, 3);
        // No sales history for the country yet.
        assert_eq!(created.selling_price, 19_500);

        let detail = fx.batches.get_batch(&admin, &created.batch.id).await.unwrap();
        assert_eq!(detail.summary.available, 3);
        assert_eq!(detail.summary.sold, 0);
        let numbers: Vec<&str> = detail.tickets.iter().map(|t| t.flight_number.as_str()).collect();
        assert_eq!(numbers, ["EK001", "EK002", "EK003"]);
        assert!(detail.tickets.iter().all(|t| t.selling_price >= 18_000));
        assert!(detail.tickets.iter().all(|t| t.status == TicketStatus::Available));
    }

    #[tokio::test]
    async fn test_create_batch_rejects_bad_input() {
        let fx = Fixture::new().await;
        let admin = fx.login_as("admin1", UserRole::Admin).await;
        let staff = fx.login_as("staff1", UserRole::Staff).await;

        let err = fx.batches.create_batch(&staff, ksa_batch(3)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let mut req = ksa_batch(3);
        req.country_code = "ZZZ".into();
        let err = fx.batches.create_batch(&admin, req).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let page = fx.batches.list_batches(&admin, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_unknown_airline_gets_derived_prefix() {
        let fx = Fixture::new().await;
        let admin = fx.login_as("admin1", UserRole::Admin).await;

        let mut req = ksa_batch(1);
        req.airline_name = "Air Blue".into();
        let created = fx.batches.create_batch(&admin, req).await.unwrap();
        let detail = fx.batches.get_batch(&admin, &created.batch.id).await.unwrap();
        assert_eq!(detail.tickets[0].flight_number, "AB001");
    }

    #[tokio::test]
    async fn test_delete_refuses_batches_with_sales() {
        let fx = Fixture::new().await;
        let admin = fx.login_as("admin1", UserRole::Admin).await;
        let created = fx.batches.create_batch(&admin, ksa_batch(2)).await.unwrap();
        let tickets = fx.ticket_repo.list_by_batch(&created.batch.id).await.unwrap();

        fx.bookings
            .create_booking(&admin, booking_request(&tickets[0].id, 20_000, PaymentType::Full))
            .await
            .unwrap();
        let err = fx
            .batches
            .delete_batch(&admin, &created.batch.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let other = fx.batches.create_batch(&admin, ksa_batch(1)).await.unwrap();
        fx.batches.delete_batch(&admin, &other.batch.id).await.unwrap();
        let err = fx.batches.get_batch(&admin, &other.batch.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
