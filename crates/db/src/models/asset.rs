//! Asset models, workflow history rows and DTOs.

use assetdesk_core::asset_workflow::AssetStatus;
use assetdesk_core::error::CoreError;
use assetdesk_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::asset_item::AssetItemWithCategory;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `assets` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    pub reference_no: String,
    pub name: String,
    pub description: Option<String>,
    pub location_id: Option<DbId>,
    pub acquired_on: Option<NaiveDate>,
    pub status: String,
    pub status_comment: Option<String>,
    pub created_by: Option<DbId>,
    pub approved_by: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Asset {
    /// Parse the stored workflow status.
    pub fn workflow_status(&self) -> Result<AssetStatus, CoreError> {
        self.status.parse()
    }
}

/// An asset with its items and their category names.
#[derive(Debug, Clone, Serialize)]
pub struct AssetWithItems {
    #[serde(flatten)]
    pub asset: Asset,
    pub items: Vec<AssetItemWithCategory>,
}

/// A row from the `asset_transitions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetTransition {
    pub id: DbId,
    pub asset_id: DbId,
    pub from_status: String,
    pub to_status: String,
    pub actor_id: Option<DbId>,
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Insert payload for a new asset. New assets always start pending approval.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAsset {
    pub reference_no: String,
    pub name: String,
    pub description: Option<String>,
    pub location_id: Option<DbId>,
    pub acquired_on: Option<NaiveDate>,
}

/// Partial update. Workflow status is never changed here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAsset {
    pub reference_no: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location_id: Option<DbId>,
    pub acquired_on: Option<NaiveDate>,
}

/// Filters accepted by the asset list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFilter {
    /// Case-insensitive substring of name or reference number.
    pub search: Option<String>,
    pub statuses: Option<Vec<String>>,
    pub location_id: Option<DbId>,
    /// Keep assets with at least one item in this status.
    pub item_status: Option<String>,
}
