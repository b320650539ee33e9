//! Asset document metadata. File bytes live in document storage under
//! `storage_key`.

use assetdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `asset_documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetDocument {
    pub id: DbId,
    pub asset_id: DbId,
    pub file_name: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum_sha256: String,
    pub uploaded_by: Option<DbId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateAssetDocument {
    pub asset_id: DbId,
    pub file_name: String,
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum_sha256: String,
    pub uploaded_by: Option<DbId>,
}
