//! First-run administrator account.
//!
//! When the `users` table is empty and `BOOTSTRAP_ADMIN_PASSWORD` is set,
//! an active `admin` user is created and granted `manage-system`. On every
//! later start this is a no-op.

use assetdesk_core::permissions::{PermissionStoreState, MANAGE_SYSTEM};
use assetdesk_core::validation::MIN_PASSWORD_LENGTH;
use assetdesk_db::models::user::{CreateUser, User};
use assetdesk_db::repositories::{PermissionRepo, UserRepo};
use assetdesk_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};

pub const BOOTSTRAP_USERNAME: &str = "admin";

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("BOOTSTRAP_ADMIN_PASSWORD rejected: {0}")]
    WeakPassword(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Credentials for the first administrator.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl BootstrapAdmin {
    /// Read `BOOTSTRAP_ADMIN_PASSWORD` and `BOOTSTRAP_ADMIN_EMAIL`
    /// (default `admin@localhost`). `None` when no password is set.
    pub fn from_env() -> Option<Self> {
        let password = std::env::var("BOOTSTRAP_ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())?;
        let email =
            std::env::var("BOOTSTRAP_ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".into());
        Some(Self { email, password })
    }
}

/// Create the first administrator if there are no users yet.
///
/// Returns the created user, or `None` if users already exist.
pub async fn ensure_bootstrap_admin(
    pool: &DbPool,
    store: PermissionStoreState,
    admin: &BootstrapAdmin,
) -> Result<Option<User>, BootstrapError> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(None);
    }

    validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)
        .map_err(BootstrapError::WeakPassword)?;
    let password_hash =
        hash_password(&admin.password).map_err(|e| BootstrapError::Hash(e.to_string()))?;

    let input = CreateUser {
        name: "Administrator".to_string(),
        username: BOOTSTRAP_USERNAME.to_string(),
        email: admin.email.clone(),
        password_hash,
        title: "System Administrator".to_string(),
        is_active: true,
    };

    let permission_ids = if store.is_ready() {
        PermissionRepo::find_by_name(pool, MANAGE_SYSTEM)
            .await?
            .map(|p| vec![p.id])
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let user = UserRepo::create_with_permissions(pool, &input, &permission_ids).await?;
    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap administrator created");
    Ok(Some(user))
}
