//! Booking domain entities.

pub mod model;
pub mod status;

pub use model::{Booking, BookingFilter, BookingView, NewBooking};
pub use status::{BookingStatus, PARTIAL_HOLD_HOURS, PaymentType};
