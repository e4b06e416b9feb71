//! Ticket browsing and manual status changes.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use agency_auth::rbac::{Permission, RbacEnforcer};
use agency_core::error::AppError;
use agency_core::types::pagination::{PageRequest, PageResponse};
use agency_database::DatabasePool;
use agency_database::repositories::{ActivityRepository, BookingRepository, TicketRepository};
use agency_entity::activity::NewActivity;
use agency_entity::booking::BookingStatus;
use agency_entity::ticket::{TicketFilter, TicketStatus, TicketView};

use super::transition::move_ticket;
use crate::context::RequestContext;

/// Ticket listing and the manual side of the ticket state machine.
#[derive(Debug, Clone)]
pub struct TicketService {
    db: DatabasePool,
    ticket_repo: Arc<TicketRepository>,
    booking_repo: Arc<BookingRepository>,
    activity_repo: Arc<ActivityRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl TicketService {
    /// Creates a new ticket service.
    pub fn new(
        db: DatabasePool,
        ticket_repo: Arc<TicketRepository>,
        booking_repo: Arc<BookingRepository>,
        activity_repo: Arc<ActivityRepository>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            db,
            ticket_repo,
            booking_repo,
            activity_repo,
            rbac,
        }
    }

    /// Lists tickets. The buying price is stripped for callers without
    /// `view_buying_price`.
    pub async fn list_tickets(
        &self,
        ctx: &RequestContext,
        filter: TicketFilter,
        page: PageRequest,
    ) -> Result<PageResponse<TicketView>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        let tickets = self.ticket_repo.list(&filter, &page).await?;
        Ok(tickets.map(|t| self.redact(ctx, t)))
    }

    /// One ticket with its flight details.
    pub async fn get_ticket(&self, ctx: &RequestContext, id: &str) -> Result<TicketView, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        let ticket = self
            .ticket_repo
            .find_view(id)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket not found"))?;
        Ok(self.redact(ctx, ticket))
    }

    /// Moves a ticket to `status`, keeping its active booking in step.
    ///
    /// * `sold` needs `confirm_sales` and confirms a pending booking.
    /// * `locked` / `booked` need `create_bookings`; locking starts a new
    ///   window.
    /// * `available` cancels the active booking. Releasing a sold ticket
    ///   needs `override_locks`, and so does releasing a held one unless
    ///   the caller owns its pending booking.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: &str,
        status: &str,
    ) -> Result<TicketView, AppError> {
        let to: TicketStatus = status.parse()?;
        match to {
            TicketStatus::Sold => self.rbac.require_permission(&ctx.role, Permission::ConfirmSales)?,
            TicketStatus::Locked | TicketStatus::Booked => {
                self.rbac.require_permission(&ctx.role, Permission::CreateBookings)?
            }
            TicketStatus::Available => {
                self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?
            }
        }

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let ticket = self
            .ticket_repo
            .find_by_id_in(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket not found"))?;
        let from = ticket.status;
        from.ensure_transition(to)?;

        if from == to && to != TicketStatus::Locked {
            drop(tx);
            return self.get_ticket(ctx, id).await;
        }

        let active = self.booking_repo.find_active_for_ticket(&mut tx, id).await?;

        if to == TicketStatus::Available {
            let owns_hold = matches!(
                &active,
                Some(b) if b.status == BookingStatus::Pending
                    && b.created_by.as_deref() == Some(ctx.user_id.as_str())
            );
            if from == TicketStatus::Sold || !owns_hold {
                self.rbac.require_permission(&ctx.role, Permission::OverrideLocks)?;
            }
        }

        move_ticket(&self.ticket_repo, &mut tx, &ticket, to, Some(&ctx.user_id), now).await?;

        if let Some(booking) = &active {
            let next = match (to, booking.status) {
                (TicketStatus::Sold, BookingStatus::Pending) => Some(BookingStatus::Confirmed),
                (TicketStatus::Available, _) => Some(BookingStatus::Cancelled),
                _ => None,
            };
            if let Some(next) = next {
                booking.status.ensure_transition(next)?;
                if !self
                    .booking_repo
                    .update_status(&mut tx, &booking.id, booking.status, next, now)
                    .await?
                {
                    return Err(AppError::conflict("Booking was modified by another request"));
                }
                info!(booking_id = %booking.id, status = %next, "Booking follows ticket status");
            }
        }

        self.activity_repo
            .record(
                &mut tx,
                &NewActivity::new("ticket.status", "ticket")
                    .by(&ctx.user_id)
                    .entity(id)
                    .details(json!({ "from": from, "to": to })),
            )
            .await?;

        tx.commit().await?;

        info!(user_id = %ctx.user_id, ticket_id = %id, from = %from, to = %to, "Ticket status changed");

        self.get_ticket(ctx, id).await
    }

    fn redact(&self, ctx: &RequestContext, ticket: TicketView) -> TicketView {
        if self.rbac.has_permission(&ctx.role, Permission::ViewBuyingPrice) {
            ticket
        } else {
            ticket.without_buying_price()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_core::error::ErrorKind;
    use agency_entity::booking::PaymentType;
    use agency_entity::user::UserRole;

    use crate::test_support::{Fixture, booking_request};

    #[tokio::test]
    async fn test_buying_price_hidden_without_capability() {
        let fx = Fixture::new().await;
        let admin = fx.login_as("admin1", UserRole::Admin).await;
        let staff = fx.login_as("staff1", UserRole::Staff).await;
        fx.stock(&admin, 2).await;

        let page = PageRequest::default();
        let seen = fx
            .tickets
            .list_tickets(&admin, TicketFilter::default(), page)
            .await
            .unwrap();
        assert_eq!(seen.items[0].buying_price, Some(15_000));

        let seen = fx
            .tickets
            .list_tickets(&staff, TicketFilter::default(), page)
            .await
            .unwrap();
        assert_eq!(seen.total, 2);
        assert!(seen.items.iter().all(|t| t.buying_price.is_none()));
    }

    #[tokio::test]
    async fn test_manual_sale_confirms_pending_booking() {
        let fx = Fixture::new().await;
        let admin = fx.login_as("admin1", UserRole::Admin).await;
        let staff = fx.login_as("staff1", UserRole::Staff).await;
        let ticket = fx.stock(&admin, 1).await.remove(0);

        let booking = fx
            .bookings
            .create_booking(&staff, booking_request(&ticket.id, 20_000, PaymentType::Partial))
            .await
            .unwrap();

        let err = fx
            .tickets
            .update_status(&staff, &ticket.id, "sold")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let view = fx.tickets.update_status(&admin, &ticket.id, "sold").await.unwrap();
        assert_eq!(view.status, TicketStatus::Sold);
        assert!(view.locked_until.is_none());

        let booking = fx.bookings.get_booking(&admin, &booking.booking.id).await.unwrap();
        assert_eq!(booking.booking.status, BookingStatus::Confirmed);
        assert!(booking.booking.confirmed_at.is_some());
        assert!(booking.booking.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_releasing_tickets() {
        let fx = Fixture::new().await;
        let admin = fx.login_as("admin1", UserRole::Admin).await;
        let staff = fx.login_as("staff1", UserRole::Staff).await;
        let other = fx.login_as("staff2", UserRole::Staff).await;
        let tickets = fx.stock(&admin, 2).await;

        // A staff member may release their own hold but not someone else's.
        let held = fx
            .bookings
            .create_booking(&staff, booking_request(&tickets[0].id, 20_000, PaymentType::Partial))
            .await
            .unwrap();
        let err = fx
            .tickets
            .update_status(&other, &tickets[0].id, "available")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let view = fx
            .tickets
            .update_status(&staff, &tickets[0].id, "available")
            .await
            .unwrap();
        assert_eq!(view.status, TicketStatus::Available);
        let held = fx.bookings.get_booking(&admin, &held.booking.id).await.unwrap();
        assert_eq!(held.booking.status, BookingStatus::Cancelled);

        // Refunding a sale needs override_locks.
        fx.bookings
            .create_booking(&admin, booking_request(&tickets[1].id, 20_000, PaymentType::Full))
            .await
            .unwrap();
        let err = fx
            .tickets
            .update_status(&staff, &tickets[1].id, "available")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let view = fx
            .tickets
            .update_status(&admin, &tickets[1].id, "available")
            .await
            .unwrap();
        assert_eq!(view.status, TicketStatus::Available);
        assert!(view.sold_by.is_none());
    }

    #[tokio::test]
    async fn test_illegal_and_unknown_transitions() {
        let fx = Fixture::new().await;
        let admin = fx.login_as("admin1", UserRole::Admin).await;
        let ticket = fx.stock(&admin, 1).await.remove(0);

        let err = fx
            .tickets
            .update_status(&admin, &ticket.id, "reserved")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        fx.tickets.update_status(&admin, &ticket.id, "sold").await.unwrap();
        let err = fx
            .tickets
            .update_status(&admin, &ticket.id, "locked")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        // Same status is a no-op.
        let view = fx.tickets.update_status(&admin, &ticket.id, "sold").await.unwrap();
        assert_eq!(view.status, TicketStatus::Sold);
    }

    #[tokio::test]
    async fn test_relocking_refreshes_window() {
        let fx = Fixture::new().await;
        let admin = fx.login_as("admin1", UserRole::Admin).await;
        let ticket = fx.stock(&admin, 1).await.remove(0);

        let first = fx.tickets.update_status(&admin, &ticket.id, "locked").await.unwrap();
        let second = fx.tickets.update_status(&admin, &ticket.id, "locked").await.unwrap();
        assert_eq!(second.status, TicketStatus::Locked);
        assert!(second.locked_until.unwrap() >= first.locked_until.unwrap());
    }
}
