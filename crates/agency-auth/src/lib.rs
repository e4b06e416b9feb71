//! # agency-auth
//!
//! Authentication and authorization for the agency back office.
//!
//! ## Modules
//!
//! - `jwt` — bearer token creation and validation
//! - `password` — Argon2id password hashing and policy enforcement
//! - `rbac` — the role → capability table and its enforcement point

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::{Permission, RbacEnforcer, RbacPolicies};
