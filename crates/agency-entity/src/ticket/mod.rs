//! Ticket domain entities.

pub mod model;
pub mod status;

pub use model::{NewTicket, Ticket, TicketFilter, TicketView};
pub use status::{LOCK_WINDOW_HOURS, TicketStatus};
