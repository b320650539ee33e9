//! Repository for the `asset_categories` table.

use assetdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::asset_category::{AssetCategory, CreateAssetCategory, UpdateAssetCategory};

const COLUMNS: &str = "id, name, description, created_at, updated_at";

pub struct AssetCategoryRepo;

impl AssetCategoryRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateAssetCategory,
    ) -> Result<AssetCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO asset_categories (name, description) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetCategory>(&query)
            .bind(&input.name)
            .bind(input.description.as_deref())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AssetCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_categories WHERE id = $1");
        sqlx::query_as::<_, AssetCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All categories, ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<AssetCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_categories ORDER BY name");
        sqlx::query_as::<_, AssetCategory>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAssetCategory,
    ) -> Result<Option<AssetCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE asset_categories SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetCategory>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.description.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a category. Its items become uncategorized.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM asset_categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
