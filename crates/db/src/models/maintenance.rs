//! Maintenance record models.

use assetdesk_core::error::CoreError;
use assetdesk_core::maintenance::MaintenanceStatus;
use assetdesk_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `asset_maintenance` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Maintenance {
    pub id: DbId,
    pub asset_id: DbId,
    pub asset_item_id: Option<DbId>,
    pub maintenance_type: String,
    pub description: Option<String>,
    pub scheduled_for: Option<NaiveDate>,
    pub completed_at: Option<Timestamp>,
    pub cost_cents: Option<i64>,
    pub status: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Maintenance {
    pub fn maintenance_status(&self) -> Result<MaintenanceStatus, CoreError> {
        self.status.parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMaintenance {
    pub asset_item_id: Option<DbId>,
    pub maintenance_type: String,
    pub description: Option<String>,
    pub scheduled_for: Option<NaiveDate>,
    pub cost_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMaintenance {
    pub asset_item_id: Option<DbId>,
    pub maintenance_type: Option<String>,
    pub description: Option<String>,
    pub scheduled_for: Option<NaiveDate>,
    pub cost_cents: Option<i64>,
    pub status: Option<MaintenanceStatus>,
}
