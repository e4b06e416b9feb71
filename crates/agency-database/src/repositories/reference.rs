//! Country and airline reference data.

use sqlx::{SqliteConnection, SqlitePool};

use agency_core::result::AppResult;
use agency_entity::reference::{Airline, Country};

use super::{db_error, new_id};

/// Repository for the static lookup tables.
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: SqlitePool,
}

impl ReferenceRepository {
    /// Create a new reference repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all countries by name.
    pub async fn list_countries(&self) -> AppResult<Vec<Country>> {
        sqlx::query_as::<_, Country>("SELECT * FROM countries ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list countries"))
    }

    /// Find a country by code (case-insensitive).
    pub async fn find_country(
        &self,
        conn: &mut SqliteConnection,
        code: &str,
    ) -> AppResult<Option<Country>> {
        sqlx::query_as::<_, Country>("SELECT * FROM countries WHERE UPPER(code) = UPPER(?)")
            .bind(code)
            .fetch_optional(conn)
            .await
            .map_err(db_error("Failed to find country"))
    }

    /// List all airlines by name.
    pub async fn list_airlines(&self) -> AppResult<Vec<Airline>> {
        sqlx::query_as::<_, Airline>("SELECT * FROM airlines ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list airlines"))
    }

    /// Find an airline by name (case-insensitive).
    pub async fn find_airline_by_name(
        &self,
        conn: &mut SqliteConnection,
        name: &str,
    ) -> AppResult<Option<Airline>> {
        sqlx::query_as::<_, Airline>("SELECT * FROM airlines WHERE LOWER(name) = LOWER(?)")
            .bind(name)
            .fetch_optional(conn)
            .await
            .map_err(db_error("Failed to find airline"))
    }

    /// Register a new airline.
    pub async fn create_airline(&self, name: &str, code: &str) -> AppResult<Airline> {
        sqlx::query_as::<_, Airline>(
            "INSERT INTO airlines (id, name, code) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(new_id())
        .bind(name)
        .bind(code.to_uppercase())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create airline"))
    }
}
