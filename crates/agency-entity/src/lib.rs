//! # agency-entity
//!
//! Domain entity models for the agency back office. Every struct in this
//! crate represents a database table row or a domain value object. All
//! entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and table
//! rows additionally derive `sqlx::FromRow`.
//!
//! Identifiers are UUIDv4 strings; money is whole currency units (`i64`).

/// Largest money amount accepted on any price or payment field.
pub const MAX_AMOUNT: i64 = 1_000_000_000;

pub mod activity;
pub mod batch;
pub mod booking;
pub mod reference;
pub mod setting;
pub mod ticket;
pub mod umrah;
pub mod user;
