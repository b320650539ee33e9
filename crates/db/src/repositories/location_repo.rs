//! Repository for the `locations` table.

use assetdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::location::{CreateLocation, Location, UpdateLocation};

const COLUMNS: &str = "id, name, region_id, parent_id, created_at, updated_at";

pub struct LocationRepo;

impl LocationRepo {
    pub async fn create(pool: &PgPool, input: &CreateLocation) -> Result<Location, sqlx::Error> {
        let query = format!(
            "INSERT INTO locations (name, region_id, parent_id) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(&input.name)
            .bind(input.region_id)
            .bind(input.parent_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE id = $1");
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Top-level locations (no parent), ordered by name.
    pub async fn list_top_level(pool: &PgPool) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE parent_id IS NULL ORDER BY name");
        sqlx::query_as::<_, Location>(&query).fetch_all(pool).await
    }

    /// Direct children of `parent_id`.
    pub async fn list_sub_locations(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE parent_id = $1 ORDER BY name");
        sqlx::query_as::<_, Location>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLocation,
    ) -> Result<Option<Location>, sqlx::Error> {
        let query = format!(
            "UPDATE locations SET \
                name = COALESCE($2, name), \
                region_id = COALESCE($3, region_id), \
                parent_id = COALESCE($4, parent_id) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.region_id)
            .bind(input.parent_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a location and its sub-locations.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
