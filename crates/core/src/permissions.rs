//! Named permissions and the access-check rules evaluated against them.
//!
//! The names must match the seed rows in `20260301000003_create_permissions.sql`.
//!
//! A check runs these rules in order and stops at the first `true`:
//!
//! 1. The permission store is not provisioned -> `false`.
//! 2. The subject is an admin -> `true`.
//! 3. The subject holds [`MANAGER_SYSTEM`] -> `true`.
//! 4. The subject directly holds the requested permission.
//!
//! [`MANAGE_SYSTEM`] (admin marker) and [`MANAGER_SYSTEM`] (global override)
//! are two separate literals and stay that way.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Permission names
// ---------------------------------------------------------------------------

/// Highest authority; marks the holder as an admin.
pub const MANAGE_SYSTEM: &str = "manage-system";
/// Marks the holder as an admin.
pub const ADMIN_ACCESS: &str = "admin-access";
/// Grants every permission without making the holder an admin.
pub const MANAGER_SYSTEM: &str = "manager-system";

pub const USER_MANAGE: &str = "user-manage";

pub const ASSET_VIEW: &str = "asset-view";
pub const ASSET_CREATE: &str = "asset-create";
pub const ASSET_EDIT: &str = "asset-edit";
pub const ASSET_DELETE: &str = "asset-delete";
pub const ASSET_APPROVE: &str = "asset-approve";
pub const ASSET_REVIEW: &str = "asset-review";
pub const ASSET_MANAGE: &str = "asset-manage";
pub const ASSET_EXPORT: &str = "asset-export";
pub const ASSET_BULK_IMPORT: &str = "asset-bulk-import";

/// Usernames that are treated as admins regardless of held permissions.
pub const ADMIN_USERNAMES: &[&str] = &["admin", "administrator"];

/// Every permission name seeded by migrations.
pub const SEEDED_PERMISSIONS: &[&str] = &[
    MANAGE_SYSTEM,
    ADMIN_ACCESS,
    MANAGER_SYSTEM,
    USER_MANAGE,
    ASSET_VIEW,
    ASSET_CREATE,
    ASSET_EDIT,
    ASSET_DELETE,
    ASSET_APPROVE,
    ASSET_REVIEW,
    ASSET_MANAGE,
    ASSET_EXPORT,
    ASSET_BULK_IMPORT,
];

// ---------------------------------------------------------------------------
// Store state
// ---------------------------------------------------------------------------

/// Whether the permission tables exist and are seeded.
///
/// Decided once at boot and carried in the application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStoreState {
    Ready,
    Unprovisioned,
}

impl PermissionStoreState {
    pub fn is_ready(self) -> bool {
        matches!(self, PermissionStoreState::Ready)
    }
}

// ---------------------------------------------------------------------------
// Permission references
// ---------------------------------------------------------------------------

/// A permission identified either by its name or by its row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionRef {
    ById(DbId),
    ByName(String),
}

impl PermissionRef {
    pub fn name(name: impl Into<String>) -> Self {
        PermissionRef::ByName(name.into())
    }
}

impl From<&str> for PermissionRef {
    fn from(name: &str) -> Self {
        PermissionRef::ByName(name.to_string())
    }
}

impl From<DbId> for PermissionRef {
    fn from(id: DbId) -> Self {
        PermissionRef::ById(id)
    }
}

/// One permission directly held by a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldPermission {
    pub id: DbId,
    pub name: String,
}

impl HeldPermission {
    fn matches(&self, target: &PermissionRef) -> bool {
        match target {
            PermissionRef::ById(id) => self.id == *id,
            PermissionRef::ByName(name) => self.name == *name,
        }
    }
}

// ---------------------------------------------------------------------------
// Access subject
// ---------------------------------------------------------------------------

/// A user's identity plus their direct permission set, loaded once per request.
#[derive(Debug, Clone)]
pub struct AccessSubject {
    pub user_id: DbId,
    pub username: String,
    pub permissions: Vec<HeldPermission>,
}

impl AccessSubject {
    /// Whether the subject directly holds `target` (no bypass rules).
    pub fn holds(&self, target: &PermissionRef) -> bool {
        self.permissions.iter().any(|p| p.matches(target))
    }

    fn holds_name(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p.name == name)
    }

    fn has_admin_username(&self) -> bool {
        ADMIN_USERNAMES.contains(&self.username.as_str())
    }

    /// Admin if the username is reserved, or the subject holds
    /// [`MANAGE_SYSTEM`] or [`ADMIN_ACCESS`].
    ///
    /// An unprovisioned store only honours the username rule.
    pub fn is_admin(&self, store: PermissionStoreState) -> bool {
        if !store.is_ready() {
            return self.has_admin_username();
        }
        self.holds_name(MANAGE_SYSTEM) || self.holds_name(ADMIN_ACCESS) || self.has_admin_username()
    }

    pub fn has_permission(&self, store: PermissionStoreState, target: &PermissionRef) -> bool {
        if !store.is_ready() {
            return false;
        }
        if self.is_admin(store) || self.holds_name(MANAGER_SYSTEM) {
            return true;
        }
        self.holds(target)
    }

    pub fn has_any_permission(&self, store: PermissionStoreState, names: &[&str]) -> bool {
        if !store.is_ready() {
            return false;
        }
        if self.is_admin(store) || self.holds_name(MANAGER_SYSTEM) {
            return true;
        }
        names.iter().any(|name| self.holds_name(name))
    }

    /// Names of every directly held permission, sorted.
    pub fn permission_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.permissions.iter().map(|p| p.name.clone()).collect();
        names.sort();
        names
    }
}
