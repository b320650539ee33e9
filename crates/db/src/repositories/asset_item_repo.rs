//! Repository for the `asset_items` table.

use assetdesk_core::item_status::DEFAULT_ITEM_STATUS;
use assetdesk_core::pagination::PageRequest;
use assetdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::asset_item::{
    AssetItem, AssetItemFilter, AssetItemWithCategory, CreateAssetItem, ItemFactRow,
    UpdateAssetItem,
};

const COLUMNS: &str = "id, asset_id, category_id, name, serial_number, tag_no, status, \
                        created_at, updated_at";

/// Item columns qualified with `i.` plus the joined category name.
const JOINED_COLUMNS: &str = "i.id, i.asset_id, i.category_id, c.name AS category_name, \
                               i.name, i.serial_number, i.tag_no, i.status, \
                               i.created_at, i.updated_at";

const FILTER: &str = "($1::bigint IS NULL OR i.asset_id = $1) \
                      AND ($2::bigint IS NULL OR i.category_id = $2) \
                      AND ($3::text IS NULL OR i.status = $3)";

pub struct AssetItemRepo;

impl AssetItemRepo {
    pub async fn create(
        pool: &PgPool,
        asset_id: DbId,
        input: &CreateAssetItem,
    ) -> Result<AssetItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO asset_items (asset_id, category_id, name, serial_number, tag_no, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetItem>(&query)
            .bind(asset_id)
            .bind(input.category_id)
            .bind(&input.name)
            .bind(input.serial_number.as_deref())
            .bind(input.tag_no.as_deref())
            .bind(input.status.as_deref().unwrap_or(DEFAULT_ITEM_STATUS))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AssetItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_items WHERE id = $1");
        sqlx::query_as::<_, AssetItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List items matching `filter` with their category names.
    pub async fn list(
        pool: &PgPool,
        filter: &AssetItemFilter,
        page: PageRequest,
    ) -> Result<(Vec<AssetItemWithCategory>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM asset_items i \
             LEFT JOIN asset_categories c ON c.id = i.category_id \
             WHERE {FILTER} \
             ORDER BY i.id LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, AssetItemWithCategory>(&query)
            .bind(filter.asset_id)
            .bind(filter.category_id)
            .bind(filter.status.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM asset_items i WHERE {FILTER}");
        let total: (i64,) = sqlx::query_as(&count_query)
            .bind(filter.asset_id)
            .bind(filter.category_id)
            .bind(filter.status.as_deref())
            .fetch_one(pool)
            .await?;

        Ok((rows, total.0))
    }

    /// Every item of the given assets, grouped by asset then id.
    pub async fn list_for_assets(
        pool: &PgPool,
        asset_ids: &[DbId],
    ) -> Result<Vec<AssetItemWithCategory>, sqlx::Error> {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM asset_items i \
             LEFT JOIN asset_categories c ON c.id = i.category_id \
             WHERE i.asset_id = ANY($1) \
             ORDER BY i.asset_id, i.id"
        );
        sqlx::query_as::<_, AssetItemWithCategory>(&query)
            .bind(asset_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAssetItem,
    ) -> Result<Option<AssetItem>, sqlx::Error> {
        let query = format!(
            "UPDATE asset_items SET \
                category_id = COALESCE($2, category_id), \
                name = COALESCE($3, name), \
                serial_number = COALESCE($4, serial_number), \
                tag_no = COALESCE($5, tag_no), \
                status = COALESCE($6, status) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetItem>(&query)
            .bind(id)
            .bind(input.category_id)
            .bind(input.name.as_deref())
            .bind(input.serial_number.as_deref())
            .bind(input.tag_no.as_deref())
            .bind(input.status.as_deref())
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM asset_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of items whose raw status equals `status` exactly.
    pub async fn count_by_status(pool: &PgPool, status: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM asset_items WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Category name and status of every item of every asset.
    pub async fn item_facts(pool: &PgPool) -> Result<Vec<ItemFactRow>, sqlx::Error> {
        sqlx::query_as::<_, ItemFactRow>(
            "SELECT c.name AS category_name, i.status \
             FROM assets a \
             JOIN asset_items i ON i.asset_id = a.id \
             LEFT JOIN asset_categories c ON c.id = i.category_id \
             ORDER BY a.id, i.id",
        )
        .fetch_all(pool)
        .await
    }
}
