//! Ticket inventory: reference data, batch intake and ticket status.

pub mod batch;
pub mod reference;
pub mod ticket;
pub(crate) mod transition;

pub use batch::{BatchCreated, BatchDetail, BatchService};
pub use reference::ReferenceService;
pub use ticket::TicketService;
