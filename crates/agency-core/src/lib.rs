//! # agency-core
//!
//! Core crate for the agency back office. Contains configuration schemas,
//! the JSON response envelope, pagination types, and the unified error
//! system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other agency crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
