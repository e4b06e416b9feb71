//! HTTP-level tests against the full router over an in-memory database.

mod helpers;

mod auth_test;
mod booking_test;
mod inventory_test;
mod permission_test;
mod umrah_test;
