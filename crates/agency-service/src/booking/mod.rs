//! Booking lifecycle.

pub mod service;

pub use service::{BookingService, CreateBookingRequest};
