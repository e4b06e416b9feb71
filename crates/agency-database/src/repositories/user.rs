//! User repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use agency_core::result::AppResult;
use agency_core::types::pagination::{PageRequest, PageResponse};
use agency_entity::user::{CreateUser, UpdateUser, User, UserStatus};

use super::{db_error, new_id};

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER(?)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by username"))
    }

    /// List all users with pagination, oldest first.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let total = self.count().await?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at ASC, username ASC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list users"))?;

        Ok(PageResponse::new(users, page, total as u64))
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))
    }

    /// Insert a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, name, email, phone, role, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'active', ?, ?)
             RETURNING *",
        )
        .bind(new_id())
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.role)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create user"))
    }

    /// Apply a partial update. Returns `None` when the user does not exist.
    pub async fn update(&self, id: &str, data: &UpdateUser) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                phone = COALESCE(?, phone),
                role = COALESCE(?, role),
                status = COALESCE(?, status),
                password_hash = COALESCE(?, password_hash),
                updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.role)
        .bind(data.status)
        .bind(&data.password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update user"))
    }

    /// Set the account status.
    pub async fn set_status(&self, id: &str, status: UserStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update user status"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a successful login.
    pub async fn update_last_login(&self, id: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update last login"))?;
        Ok(())
    }

    /// Hard-delete a user.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete user"))?;
        Ok(result.rows_affected() > 0)
    }
}
