//! Permission entity model.

use assetdesk_core::permissions::HeldPermission;
use assetdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `permissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Permission {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Permission> for HeldPermission {
    fn from(p: &Permission) -> Self {
        HeldPermission {
            id: p.id,
            name: p.name.clone(),
        }
    }
}

/// A permission joined with the user holding it, for batch loading.
#[derive(Debug, Clone, FromRow)]
pub struct UserPermissionRow {
    pub user_id: DbId,
    pub id: DbId,
    pub name: String,
}

/// Compact permission shape embedded in user responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionSummary {
    pub id: DbId,
    pub name: String,
}

impl From<&Permission> for PermissionSummary {
    fn from(p: &Permission) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
        }
    }
}

impl From<UserPermissionRow> for PermissionSummary {
    fn from(row: UserPermissionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}
