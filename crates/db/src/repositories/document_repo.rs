//! Repository for the `asset_documents` table.

use assetdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{AssetDocument, CreateAssetDocument};

const COLUMNS: &str = "id, asset_id, file_name, storage_key, mime_type, size_bytes, \
                        checksum_sha256, uploaded_by, created_at";

pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateAssetDocument,
    ) -> Result<AssetDocument, sqlx::Error> {
        let query = format!(
            "INSERT INTO asset_documents \
                (asset_id, file_name, storage_key, mime_type, size_bytes, checksum_sha256, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetDocument>(&query)
            .bind(input.asset_id)
            .bind(&input.file_name)
            .bind(&input.storage_key)
            .bind(&input.mime_type)
            .bind(input.size_bytes)
            .bind(&input.checksum_sha256)
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AssetDocument>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_documents WHERE id = $1");
        sqlx::query_as::<_, AssetDocument>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Documents attached to one asset, newest first.
    pub async fn list_for_asset(
        pool: &PgPool,
        asset_id: DbId,
    ) -> Result<Vec<AssetDocument>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_documents WHERE asset_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, AssetDocument>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }

    /// Delete the metadata row, returning it so the caller can remove the file.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<AssetDocument>, sqlx::Error> {
        let query = format!("DELETE FROM asset_documents WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, AssetDocument>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
