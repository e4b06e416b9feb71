//! Umrah package records and group seat blocks.

pub mod group;
pub mod package;

pub use group::GroupTicketService;
pub use package::UmrahService;
