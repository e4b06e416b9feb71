//! Periodic release of expired holds.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tokio::sync::watch;
use tokio::time;
use tracing::{error, info};

use agency_core::error::AppError;
use agency_database::DatabasePool;
use agency_database::repositories::{ActivityRepository, BookingRepository, TicketRepository};
use agency_entity::activity::NewActivity;
use agency_entity::booking::BookingStatus;

use crate::inventory::transition::release_ticket;

/// What one sweep changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Pending bookings marked expired.
    pub expired_bookings: u32,
    /// Tickets returned to sale.
    pub released_tickets: u32,
}

/// Expires overdue partial-payment bookings and releases stale locks.
#[derive(Debug, Clone)]
pub struct ExpirySweeper {
    db: DatabasePool,
    booking_repo: Arc<BookingRepository>,
    ticket_repo: Arc<TicketRepository>,
    activity_repo: Arc<ActivityRepository>,
}

impl ExpirySweeper {
    /// Creates a new sweeper.
    pub fn new(
        db: DatabasePool,
        booking_repo: Arc<BookingRepository>,
        ticket_repo: Arc<TicketRepository>,
        activity_repo: Arc<ActivityRepository>,
    ) -> Self {
        Self {
            db,
            booking_repo,
            ticket_repo,
            activity_repo,
        }
    }

    /// Runs one sweep in a single transaction.
    ///
    /// 1. Pending bookings past `expires_at` become expired and their
    ///    tickets return to available.
    /// 2. Locked tickets past `locked_until` with no pending booking return
    ///    to available.
    pub async fn sweep_once(&self) -> Result<SweepReport, AppError> {
        let now = Utc::now();
        let mut report = SweepReport::default();
        let mut tx = self.db.begin().await?;

        for booking in self.booking_repo.overdue_pending(&mut tx, now).await? {
            let expired = self
                .booking_repo
                .update_status(
                    &mut tx,
                    &booking.id,
                    BookingStatus::Pending,
                    BookingStatus::Expired,
                    now,
                )
                .await?;
            if !expired {
                continue;
            }
            report.expired_bookings += 1;
            release_ticket(&self.ticket_repo, &mut tx, &booking.ticket_id, now).await?;
            report.released_tickets += 1;
        }

        for ticket in self.ticket_repo.stale_locks(&mut tx, now).await? {
            release_ticket(&self.ticket_repo, &mut tx, &ticket.id, now).await?;
            report.released_tickets += 1;
        }

        if report != SweepReport::default() {
            self.activity_repo
                .record(
                    &mut tx,
                    &NewActivity::new("maintenance.release_expired", "ticket").details(json!({
                        "expired_bookings": report.expired_bookings,
                        "released_tickets": report.released_tickets,
                    })),
                )
                .await?;
        }

        tx.commit().await?;

        if report != SweepReport::default() {
            info!(
                expired_bookings = report.expired_bookings,
                released_tickets = report.released_tickets,
                "Expired holds released"
            );
        }
        Ok(report)
    }

    /// Sweeps every `interval` until `cancel` turns true.
    pub async fn run(&self, interval: Duration, mut cancel: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "Expiry sweeper started");

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Expiry sweeper received shutdown signal");
                        break;
                    }
                }
                _ = time::sleep(interval) => {
                    if let Err(e) = self.sweep_once().await {
                        error!(error = %e, "Expiry sweep failed");
                    }
                }
            }
        }

        info!("Expiry sweeper stopped");
    }
}
