//! User entity model and DTOs.

use assetdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::permission::PermissionSummary;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub title: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub title: String,
    pub is_active: bool,
    pub permissions: Vec<PermissionSummary>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserResponse {
    pub fn from_user(user: User, permissions: Vec<PermissionSummary>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            title: user.title,
            is_active: user.is_active,
            permissions,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Insert payload. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub title: String,
    pub is_active: bool,
}

/// Full replacement of the editable columns. `password_hash` is only
/// written when present.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub title: String,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
}

/// Self-service profile patch.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    /// Already hashed.
    pub password_hash: Option<String>,
}

/// Filters accepted by the user list.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Case-insensitive substring of name or email.
    pub search: Option<String>,
    /// `None` lists everyone.
    pub is_active: Option<bool>,
}
