//! Admin user management: CRUD, status changes, password resets.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use agency_auth::password::{PasswordHasher, PasswordValidator};
use agency_auth::rbac::{Permission, RbacEnforcer};
use agency_core::error::AppError;
use agency_core::types::pagination::{PageRequest, PageResponse};
use agency_database::repositories::{ActivityRepository, UserRepository};
use agency_entity::activity::NewActivity;
use agency_entity::user::{CreateUser, UpdateUser, User, UserRole, UserStatus};

use crate::context::RequestContext;

/// Request to create a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
}

/// Request to update a user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    /// New password, hashed before storage.
    pub password: Option<String>,
}

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    user_repo: Arc<UserRepository>,
    activity_repo: Arc<ActivityRepository>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    rbac: Arc<RbacEnforcer>,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        activity_repo: Arc<ActivityRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            user_repo,
            activity_repo,
            hasher,
            validator,
            rbac,
        }
    }

    /// Lists all users with pagination.
    pub async fn list_users(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<User>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ManageUsers)?;
        self.user_repo.find_all(&page).await
    }

    /// Gets a single user by ID.
    pub async fn get_user(&self, ctx: &RequestContext, user_id: &str) -> Result<User, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ManageUsers)?;
        self.find(user_id).await
    }

    /// Creates a new user.
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        req: CreateUserRequest,
    ) -> Result<User, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ManageUsers)?;

        let user = self.insert(req).await?;

        self.activity_repo
            .log(
                &NewActivity::new("user.create", "user")
                    .by(&ctx.user_id)
                    .entity(&user.id)
                    .details(json!({ "username": user.username, "role": user.role })),
            )
            .await?;

        info!(
            admin_id = %ctx.user_id,
            new_user_id = %user.id,
            username = %user.username,
            role = %user.role,
            "User created by admin"
        );

        Ok(user)
    }

    /// Updates a user's profile, role, status or password.
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        req: UpdateUserRequest,
    ) -> Result<User, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ManageUsers)?;

        if user_id == ctx.user_id {
            if matches!(req.role, Some(role) if role != ctx.role) {
                return Err(AppError::validation("Cannot change your own role"));
            }
            if req.status == Some(UserStatus::Inactive) {
                return Err(AppError::validation("Cannot deactivate your own account"));
            }
        }

        let password_hash = match req.password.as_deref() {
            Some(password) => {
                self.validator.validate(password)?;
                Some(self.hasher.hash_password(password)?)
            }
            None => None,
        };

        let update = UpdateUser {
            name: req.name.map(|n| n.trim().to_string()),
            email: req.email,
            phone: req.phone,
            role: req.role,
            status: req.status,
            password_hash,
        };

        let user = self
            .user_repo
            .update(user_id, &update)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        self.activity_repo
            .log(
                &NewActivity::new("user.update", "user")
                    .by(&ctx.user_id)
                    .entity(&user.id),
            )
            .await?;

        info!(admin_id = %ctx.user_id, target_id = %user_id, "User updated by admin");

        Ok(user)
    }

    /// Activates or deactivates an account.
    pub async fn set_status(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        status: UserStatus,
    ) -> Result<User, AppError> {
        self.update_user(
            ctx,
            user_id,
            UpdateUserRequest {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Deletes a user.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: &str) -> Result<(), AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ManageUsers)?;

        if user_id == ctx.user_id {
            return Err(AppError::validation("Cannot delete your own account"));
        }

        if !self.user_repo.delete(user_id).await? {
            return Err(AppError::not_found("User not found"));
        }

        self.activity_repo
            .log(
                &NewActivity::new("user.delete", "user")
                    .by(&ctx.user_id)
                    .entity(user_id),
            )
            .await?;

        info!(admin_id = %ctx.user_id, target_id = %user_id, "User deleted by admin");

        Ok(())
    }

    /// Creates an `admin` account when no user exists yet.
    ///
    /// Returns the created user, or `None` when the table was not empty.
    pub async fn ensure_initial_admin(&self, password: &str) -> Result<Option<User>, AppError> {
        if self.user_repo.count().await? > 0 {
            return Ok(None);
        }

        let user = self
            .insert(CreateUserRequest {
                username: "admin".to_string(),
                password: password.to_string(),
                name: "Administrator".to_string(),
                email: None,
                phone: None,
                role: UserRole::Admin,
            })
            .await?;

        info!(user_id = %user.id, "Initial admin account created");
        Ok(Some(user))
    }

    /// Creates a user without a permission check, for the CLI and bootstrap.
    pub async fn insert(&self, req: CreateUserRequest) -> Result<User, AppError> {
        let username = req.username.trim();
        if username.chars().count() < 3 {
            return Err(AppError::validation(
                "Username must be at least 3 characters",
            ));
        }
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Name is required"));
        }

        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict("Username is already taken"));
        }

        self.validator.validate(&req.password)?;
        let password_hash = self.hasher.hash_password(&req.password)?;

        self.user_repo
            .create(&CreateUser {
                username: username.to_string(),
                password_hash,
                name: req.name.trim().to_string(),
                email: req.email,
                phone: req.phone,
                role: req.role,
            })
            .await
    }

    async fn find(&self, user_id: &str) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
