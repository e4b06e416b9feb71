//! Password policy for new and changed passwords.

use agency_core::config::AuthConfig;
use agency_core::error::AppError;

/// Validates passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Rejects passwords that are too short or blank.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.trim().is_empty() {
            return Err(AppError::validation("Password cannot be blank"));
        }
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }
}
