//! Login and bearer token resolution.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use agency_auth::jwt::{IssuedToken, JwtDecoder, JwtEncoder};
use agency_auth::password::PasswordHasher;
use agency_core::error::AppError;
use agency_database::repositories::UserRepository;
use agency_entity::user::User;

use crate::context::RequestContext;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    /// Signed bearer token.
    pub token: String,
    /// Token expiry.
    pub expires_at: chrono::DateTime<chrono::Utc>,
    /// The logged-in user, with `last_login` updated.
    pub user: User,
}

/// Verifies credentials and turns bearer tokens back into users.
#[derive(Debug, Clone)]
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            encoder,
            decoder,
        }
    }

    /// Performs the login flow:
    ///
    /// 1. Find the user (case-insensitive username)
    /// 2. Verify the password
    /// 3. Reject inactive accounts
    /// 4. Record the login and issue a token
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AppError> {
        let Some(user) = self.user_repo.find_by_username(username.trim()).await? else {
            warn!(username = %username, "Login rejected: unknown user");
            return Err(AppError::authentication("Invalid username or password"));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::authentication("Invalid username or password"));
        }

        if !user.can_login() {
            warn!(user_id = %user.id, "Login rejected: account inactive");
            return Err(AppError::authentication("Account is inactive"));
        }

        self.user_repo.update_last_login(&user.id).await?;
        let user = self
            .user_repo
            .find_by_id(&user.id)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

        let IssuedToken { token, expires_at } = self.encoder.issue(&user)?;
        info!(user_id = %user.id, username = %user.username, "Login successful");

        Ok(LoginResult {
            token,
            expires_at,
            user,
        })
    }

    /// Resolves a bearer token into a request context.
    ///
    /// The user is reloaded so that role changes and deactivation take
    /// effect before the token expires.
    pub async fn authenticate(&self, token: &str) -> Result<(User, RequestContext), AppError> {
        let claims = self.decoder.decode(token)?;
        let user = self
            .user_repo
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;

        if !user.can_login() {
            return Err(AppError::authentication("Account is inactive"));
        }

        let ctx = RequestContext::for_user(&user);
        Ok((user, ctx))
    }

    /// Loads the current user.
    pub async fn current_user(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(&ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
