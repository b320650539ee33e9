//! Asset item models and DTOs.

use assetdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `asset_items` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct AssetItem {
    pub id: DbId,
    pub asset_id: DbId,
    pub category_id: Option<DbId>,
    pub name: String,
    pub serial_number: Option<String>,
    pub tag_no: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An item joined with its category name (`None` when uncategorized).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct AssetItemWithCategory {
    pub id: DbId,
    pub asset_id: DbId,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub name: String,
    pub serial_number: Option<String>,
    pub tag_no: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssetItem {
    pub category_id: Option<DbId>,
    pub name: String,
    pub serial_number: Option<String>,
    pub tag_no: Option<String>,
    /// Defaults to `in_use`.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssetItem {
    pub category_id: Option<DbId>,
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub tag_no: Option<String>,
    pub status: Option<String>,
}

/// Filters accepted by the item list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetItemFilter {
    pub asset_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub status: Option<String>,
}

/// Category name and raw status of one item, as fed to the dashboard.
#[derive(Debug, Clone, FromRow)]
pub struct ItemFactRow {
    pub category_name: Option<String>,
    pub status: String,
}
