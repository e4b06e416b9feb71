//! # agency-database
//!
//! SQLite connection management, the migration runner and concrete
//! repository implementations for all back-office entities.
//!
//! Repositories are built from an injected pool. Methods that take a
//! `&mut SqliteConnection` run on a caller-owned transaction; every other
//! method uses the pool directly.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use migration::run_migrations;
