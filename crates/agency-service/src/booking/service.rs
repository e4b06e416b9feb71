//! Booking creation and lifecycle.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use agency_auth::rbac::{Permission, RbacEnforcer};
use agency_core::error::AppError;
use agency_core::types::pagination::{PageRequest, PageResponse};
use agency_database::DatabasePool;
use agency_database::repositories::{ActivityRepository, BookingRepository, TicketRepository};
use agency_entity::activity::NewActivity;
use agency_entity::booking::{
    Booking, BookingFilter, BookingStatus, BookingView, NewBooking, PARTIAL_HOLD_HOURS,
    PaymentType,
};
use agency_entity::ticket::TicketStatus;

use crate::context::RequestContext;
use crate::financial::{FinancialService, check_amount};
use crate::inventory::transition::{move_ticket, release_ticket};

/// Everything needed to sell one ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub ticket_id: String,
    pub agent_name: String,
    pub agent_email: Option<String>,
    pub agent_phone: Option<String>,
    pub passenger_name: String,
    pub passenger_passport: Option<String>,
    pub passenger_phone: Option<String>,
    pub passenger_email: Option<String>,
    pub pax_count: Option<i64>,
    pub selling_price: i64,
    pub payment_type: PaymentType,
    pub partial_amount: Option<i64>,
    pub payment_method: String,
    pub comments: Option<String>,
}

/// Sells tickets and drives bookings through their lifecycle.
#[derive(Debug, Clone)]
pub struct BookingService {
    db: DatabasePool,
    booking_repo: Arc<BookingRepository>,
    ticket_repo: Arc<TicketRepository>,
    activity_repo: Arc<ActivityRepository>,
    financial: Arc<FinancialService>,
    rbac: Arc<RbacEnforcer>,
}

impl BookingService {
    /// Creates a new booking service.
    pub fn new(
        db: DatabasePool,
        booking_repo: Arc<BookingRepository>,
        ticket_repo: Arc<TicketRepository>,
        activity_repo: Arc<ActivityRepository>,
        financial: Arc<FinancialService>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            db,
            booking_repo,
            ticket_repo,
            activity_repo,
            financial,
            rbac,
        }
    }

    /// Books an available ticket.
    ///
    /// * partial payment: pending for [`PARTIAL_HOLD_HOURS`], ticket locked
    /// * full payment by a caller who can confirm sales: confirmed, ticket sold
    /// * full payment otherwise: pending until confirmed, ticket booked
    ///
    /// The ticket move and the booking insert commit together.
    pub async fn create_booking(
        &self,
        ctx: &RequestContext,
        req: CreateBookingRequest,
    ) -> Result<BookingView, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBookings)?;
        if req.payment_type == PaymentType::Partial {
            self.rbac.require_permission(&ctx.role, Permission::PartialPayments)?;
            match req.partial_amount {
                Some(amount) if amount > 0 => {}
                _ => {
                    return Err(AppError::validation(
                        "Partial amount is required for a partial payment",
                    ));
                }
            }
        }
        check_request(&req)?;

        let now = Utc::now();
        let can_confirm = self.rbac.has_permission(&ctx.role, Permission::ConfirmSales);
        let (status, ticket_status, confirmed_at, expires_at) = match req.payment_type {
            PaymentType::Partial => (
                BookingStatus::Pending,
                TicketStatus::Locked,
                None,
                Some(now + Duration::hours(PARTIAL_HOLD_HOURS)),
            ),
            PaymentType::Full if can_confirm => (
                BookingStatus::Confirmed,
                TicketStatus::Sold,
                Some(now),
                None,
            ),
            PaymentType::Full => (BookingStatus::Pending, TicketStatus::Booked, None, None),
        };

        let mut tx = self.db.begin().await?;

        let ticket = self
            .financial
            .check_booking(&mut tx, &req.ticket_id, req.selling_price)
            .await?
            .into_ticket()?;

        move_ticket(
            &self.ticket_repo,
            &mut tx,
            &ticket,
            ticket_status,
            Some(&ctx.user_id),
            now,
        )
        .await?;

        let booking = self
            .booking_repo
            .insert(
                &mut tx,
                &NewBooking {
                    ticket_id: ticket.id.clone(),
                    agent_name: req.agent_name.trim().to_string(),
                    agent_email: req.agent_email,
                    agent_phone: req.agent_phone,
                    passenger_name: req.passenger_name.trim().to_string(),
                    passenger_passport: req.passenger_passport,
                    passenger_phone: req.passenger_phone,
                    passenger_email: req.passenger_email,
                    pax_count: req.pax_count.unwrap_or(1),
                    selling_price: req.selling_price,
                    payment_type: req.payment_type,
                    partial_amount: req.partial_amount.filter(|_| req.payment_type == PaymentType::Partial),
                    payment_method: req.payment_method.trim().to_string(),
                    comments: req.comments,
                    status,
                    created_by: ctx.user_id.clone(),
                    confirmed_at,
                    expires_at,
                },
                now,
            )
            .await?;

        self.activity_repo
            .record(
                &mut tx,
                &NewActivity::new("booking.create", "booking")
                    .by(&ctx.user_id)
                    .entity(&booking.id)
                    .details(json!({
                        "ticket_id": booking.ticket_id,
                        "selling_price": booking.selling_price,
                        "payment_type": booking.payment_type,
                        "status": booking.status,
                    })),
            )
            .await?;

        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            booking_id = %booking.id,
            ticket_id = %booking.ticket_id,
            status = %booking.status,
            "Booking created"
        );

        Ok(BookingView::at(booking, now))
    }

    /// Lists bookings; callers without `view_all_bookings` see only their own.
    pub async fn list_bookings(
        &self,
        ctx: &RequestContext,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> Result<PageResponse<BookingView>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;

        let filter = BookingFilter {
            status,
            created_by: (!self.sees_all(ctx)).then(|| ctx.user_id.clone()),
        };
        let now = Utc::now();
        let bookings = self.booking_repo.list(&filter, &page).await?;
        Ok(bookings.map(|b| BookingView::at(b, now)))
    }

    /// One booking, subject to the same visibility rule as the listing.
    pub async fn get_booking(&self, ctx: &RequestContext, id: &str) -> Result<BookingView, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        let booking = self
            .booking_repo
            .find_by_id(id)
            .await?
            .filter(|b| self.visible(ctx, b))
            .ok_or_else(|| AppError::not_found("Booking not found"))?;
        Ok(BookingView::at(booking, Utc::now()))
    }

    /// Moves a booking to `status` and its ticket along with it.
    ///
    /// Repeating the current status is a no-op. A pending booking whose
    /// hold has run out can only be marked expired.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: &str,
        status: &str,
    ) -> Result<BookingView, AppError> {
        let to: BookingStatus = status.parse()?;
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        match to {
            BookingStatus::Confirmed => {
                self.rbac.require_permission(&ctx.role, Permission::ConfirmSales)?
            }
            _ => self.rbac.require_permission(&ctx.role, Permission::CreateBookings)?,
        }

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let booking = self
            .booking_repo
            .find_by_id_in(&mut tx, id)
            .await?
            .filter(|b| self.visible(ctx, b))
            .ok_or_else(|| AppError::not_found("Booking not found"))?;
        let from = booking.status;

        if from == to {
            drop(tx);
            return Ok(BookingView::at(booking, now));
        }
        if booking.effective_status(now) == BookingStatus::Expired && to != BookingStatus::Expired {
            return Err(AppError::conflict("Booking hold has expired"));
        }
        from.ensure_transition(to)?;
        if from == BookingStatus::Confirmed {
            self.rbac.require_permission(&ctx.role, Permission::OverrideLocks)?;
        }

        if !self
            .booking_repo
            .update_status(&mut tx, id, from, to, now)
            .await?
        {
            return Err(AppError::conflict("Booking was modified by another request"));
        }

        match to {
            BookingStatus::Confirmed => {
                let ticket = self
                    .ticket_repo
                    .find_by_id_in(&mut tx, &booking.ticket_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Ticket not found"))?;
                move_ticket(
                    &self.ticket_repo,
                    &mut tx,
                    &ticket,
                    TicketStatus::Sold,
                    Some(&ctx.user_id),
                    now,
                )
                .await?;
            }
            BookingStatus::Cancelled | BookingStatus::Expired => {
                release_ticket(&self.ticket_repo, &mut tx, &booking.ticket_id, now).await?;
            }
            BookingStatus::Pending => {}
        }

        self.activity_repo
            .record(
                &mut tx,
                &NewActivity::new("booking.status", "booking")
                    .by(&ctx.user_id)
                    .entity(id)
                    .details(json!({ "from": from, "to": to })),
            )
            .await?;

        tx.commit().await?;

        info!(user_id = %ctx.user_id, booking_id = %id, from = %from, to = %to, "Booking status changed");

        let booking = self
            .booking_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))?;
        Ok(BookingView::at(booking, Utc::now()))
    }

    /// Deletes a booking, releasing its ticket if the booking still held it.
    pub async fn delete_booking(&self, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
        self.rbac.require_permission(&ctx.role, Permission::DeleteBookings)?;

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let booking = self
            .booking_repo
            .find_by_id_in(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))?;

        self.booking_repo.delete(&mut tx, id).await?;
        if booking.holds_ticket() {
            release_ticket(&self.ticket_repo, &mut tx, &booking.ticket_id, now).await?;
        }

        self.activity_repo
            .record(
                &mut tx,
                &NewActivity::new("booking.delete", "booking")
                    .by(&ctx.user_id)
                    .entity(id)
                    .details(json!({ "ticket_id": booking.ticket_id, "status": booking.status })),
            )
            .await?;

        tx.commit().await?;

        info!(user_id = %ctx.user_id, booking_id = %id, "Booking deleted");
        Ok(())
    }

    fn sees_all(&self, ctx: &RequestContext) -> bool {
        self.rbac.has_permission(&ctx.role, Permission::ViewAllBookings)
    }

    fn visible(&self, ctx: &RequestContext, booking: &Booking) -> bool {
        self.sees_all(ctx) || booking.created_by.as_deref() == Some(ctx.user_id.as_str())
    }
}

fn check_request(req: &CreateBookingRequest) -> Result<(), AppError> {
    if req.agent_name.trim().is_empty() {
        return Err(AppError::validation("Agent name is required"));
    }
    if req.passenger_name.trim().is_empty() {
        return Err(AppError::validation("Passenger name is required"));
    }
    if req.payment_method.trim().is_empty() {
        return Err(AppError::validation("Payment method is required"));
    }
    if matches!(req.pax_count, Some(n) if n < 1) {
        return Err(AppError::validation("Passenger count must be at least 1"));
    }
    check_amount("Selling price", req.selling_price)?;
    if let Some(amount) = req.partial_amount {
        check_amount("Partial amount", amount)?;
    }
    Ok(())
}
