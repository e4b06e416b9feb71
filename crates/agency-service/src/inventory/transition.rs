//! Ticket moves shared by the ticket, booking and sweeper flows.
//!
//! All functions run on a caller-owned transaction connection.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqliteConnection;

use agency_core::error::AppError;
use agency_database::repositories::TicketRepository;
use agency_database::repositories::ticket::StatusChange;
use agency_entity::ticket::{LOCK_WINDOW_HOURS, Ticket, TicketStatus};

/// Move `ticket` to `to`, failing with a conflict if another writer
/// changed it since it was read.
///
/// Locking always starts a fresh window; every other status clears it.
pub(crate) async fn move_ticket(
    repo: &TicketRepository,
    conn: &mut SqliteConnection,
    ticket: &Ticket,
    to: TicketStatus,
    sold_by: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    ticket.status.ensure_transition(to)?;

    let locked_until = (to == TicketStatus::Locked).then(|| now + Duration::hours(LOCK_WINDOW_HOURS));
    let change = StatusChange {
        from: ticket.status,
        to,
        locked_until,
        sold_by,
        now,
    };

    if repo.apply_status(conn, &ticket.id, &change).await? {
        Ok(())
    } else {
        Err(AppError::conflict("Ticket was modified by another request"))
    }
}

/// Return a ticket to sale. A ticket that is already available is left
/// as it is.
pub(crate) async fn release_ticket(
    repo: &TicketRepository,
    conn: &mut SqliteConnection,
    ticket_id: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let Some(ticket) = repo.find_by_id_in(conn, ticket_id).await? else {
        return Ok(());
    };
    if ticket.status == TicketStatus::Available {
        return Ok(());
    }
    move_ticket(repo, conn, &ticket, TicketStatus::Available, None, now).await
}
