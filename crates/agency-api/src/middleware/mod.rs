//! Axum middleware stack.

pub mod cors;
pub mod error_details;
pub mod logging;
