//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod batch;
pub mod booking;
pub mod financial;
pub mod health;
pub mod reference;
pub mod settings;
pub mod ticket;
pub mod umrah;
pub mod user;
