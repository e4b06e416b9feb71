//! # agency-service
//!
//! Business logic service layer for the agency back office. Each service
//! orchestrates repositories and the permission model to implement one
//! family of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. Every multi-row mutation
//! runs in one database transaction.

pub mod auth;
pub mod booking;
pub mod context;
pub mod financial;
pub mod inventory;
pub mod maintenance;
pub mod settings;
pub mod umrah;
pub mod user;

pub use auth::AuthService;
pub use booking::BookingService;
pub use context::RequestContext;
pub use financial::FinancialService;
pub use inventory::{BatchService, ReferenceService, TicketService};
pub use maintenance::{ExpirySweeper, SweepReport};
pub use settings::SettingsService;
pub use umrah::{GroupTicketService, UmrahService};
pub use user::AdminUserService;

#[cfg(test)]
pub(crate) mod test_support;
