//! Group Umrah seat blocks and passenger assignment.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use agency_auth::rbac::{Permission, RbacEnforcer};
use agency_core::error::AppError;
use agency_database::DatabasePool;
use agency_database::repositories::{ActivityRepository, GroupTicketRepository};
use agency_entity::activity::NewActivity;
use agency_entity::umrah::{AssignGroupSeat, CreateGroupTicket, UmrahGroupBooking, UmrahGroupTicket};

use super::package::parse_date;
use crate::context::RequestContext;
use crate::financial::check_amount;

/// Manages block-booked group seats.
#[derive(Debug, Clone)]
pub struct GroupTicketService {
    db: DatabasePool,
    group_repo: Arc<GroupTicketRepository>,
    activity_repo: Arc<ActivityRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl GroupTicketService {
    /// Creates a new group ticket service.
    pub fn new(
        db: DatabasePool,
        group_repo: Arc<GroupTicketRepository>,
        activity_repo: Arc<ActivityRepository>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            db,
            group_repo,
            activity_repo,
            rbac,
        }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<UmrahGroupTicket>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        self.group_repo.list().await
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        mut req: CreateGroupTicket,
    ) -> Result<UmrahGroupTicket, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBatches)?;

        req.group_name = req.group_name.trim().to_string();
        req.airline_name = req.airline_name.trim().to_string();
        if req.group_name.is_empty() {
            return Err(AppError::validation("Group name is required"));
        }
        if req.airline_name.is_empty() {
            return Err(AppError::validation("Airline is required"));
        }
        parse_date(&req.departure_date, "Departure date")?;
        if req.total_tickets <= 0 {
            return Err(AppError::validation("Total tickets must be greater than zero"));
        }
        if req.buying_price < 0 {
            return Err(AppError::validation("Buying price cannot be negative"));
        }
        check_amount("Buying price", req.buying_price)?;

        let group = self.group_repo.create(&req, &ctx.user_id).await?;
        self.activity_repo
            .log(
                &NewActivity::new("group_ticket.create", "umrah_group_ticket")
                    .by(&ctx.user_id)
                    .entity(&group.id)
                    .details(json!({ "total_tickets": group.total_tickets })),
            )
            .await?;

        info!(user_id = %ctx.user_id, group_id = %group.id, seats = group.total_tickets, "Group ticket created");
        Ok(group)
    }

    /// Passengers assigned to a block.
    pub async fn bookings(
        &self,
        ctx: &RequestContext,
        group_ticket_id: &str,
    ) -> Result<Vec<UmrahGroupBooking>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        if self.group_repo.find_by_id(group_ticket_id).await?.is_none() {
            return Err(AppError::not_found("Group ticket not found"));
        }
        self.group_repo.bookings_for(group_ticket_id).await
    }

    /// Places a passenger on the oldest block for the departure date that
    /// still has a free seat. The seat count check and the insert share
    /// one transaction.
    pub async fn auto_assign(
        &self,
        ctx: &RequestContext,
        req: AssignGroupSeat,
    ) -> Result<UmrahGroupBooking, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBookings)?;

        if req.passenger_name.trim().is_empty() {
            return Err(AppError::validation("Passenger name is required"));
        }
        parse_date(&req.departure_date, "Departure date")?;

        let mut tx = self.db.begin().await?;
        let group = self
            .group_repo
            .first_with_seats(&mut tx, &req.departure_date)
            .await?
            .ok_or_else(|| {
                AppError::conflict(format!(
                    "No group ticket with free seats departs on {}",
                    req.departure_date
                ))
            })?;

        let booking = self
            .group_repo
            .insert_booking(&mut tx, &group.id, &req, &ctx.user_id)
            .await?;
        self.activity_repo
            .record(
                &mut tx,
                &NewActivity::new("group_ticket.assign", "umrah_group_booking")
                    .by(&ctx.user_id)
                    .entity(&booking.id)
                    .details(json!({ "group_ticket_id": group.id })),
            )
            .await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            group_id = %group.id,
            remaining = group.remaining_tickets - 1,
            "Passenger assigned to group ticket"
        );
        Ok(booking)
    }
}
