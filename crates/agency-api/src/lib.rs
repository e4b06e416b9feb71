//! # agency-api
//!
//! HTTP API layer for the agency back office built on Axum.
//!
//! Provides every REST endpoint under `/api`, the middleware stack (request
//! logging, CORS, compression, error diagnostics), extractors, and DTOs.
//! Every response uses the `{success, message, data?, errors?}` envelope
//! from `agency-core`.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
