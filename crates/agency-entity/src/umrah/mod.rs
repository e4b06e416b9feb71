//! Umrah package entities.
//!
//! These records are independent of the flight ticket inventory. Group
//! tickets mirror the batch/ticket pattern for block-booked Umrah seats.

pub mod group;
pub mod package;
pub mod payment;

pub use group::{AssignGroupSeat, CreateGroupTicket, UmrahGroupBooking, UmrahGroupTicket};
pub use package::{UmrahTransportInput, UmrahWithTransport};
pub use payment::{UmrahPaymentInput, UmrahWithoutTransport};
