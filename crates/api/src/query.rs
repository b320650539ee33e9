//! Shared query parameter types for API handlers.

use assetdesk_core::asset_workflow::AssetStatus;
use assetdesk_core::error::CoreError;
use assetdesk_core::types::DbId;
use serde::{Deserialize, Serialize};

/// `GET /settings/users` filters.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct UserListParams {
    pub search: Option<String>,
    /// `active`, `inactive` or `All` (default).
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl UserListParams {
    /// Map the status filter to an `is_active` constraint.
    pub fn is_active(&self) -> Result<Option<bool>, CoreError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("active") => Ok(Some(true)),
            Some(s) if s.eq_ignore_ascii_case("inactive") => Ok(Some(false)),
            Some(other) => Err(CoreError::field(
                "status",
                format!("Unknown status filter '{other}'."),
            )),
        }
    }
}

/// `GET /assets-management` filters.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct AssetListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub location_id: Option<DbId>,
    /// Item status tag, e.g. `maintenance`.
    pub item_status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl AssetListParams {
    pub fn status(&self) -> Result<Option<AssetStatus>, CoreError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s
                .parse()
                .map(Some)
                .map_err(|_| CoreError::field("status", format!("Unknown asset status '{s}'."))),
        }
    }
}

/// `GET /assets-management/{id}/items` filters.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ItemListParams {
    pub category_id: Option<DbId>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
