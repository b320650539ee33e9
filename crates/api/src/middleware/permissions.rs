//! Permission-based access control extractors.
//!
//! [`CurrentSubject`] loads the caller's row and direct permissions once per
//! request. Each `Require*` extractor wraps it and rejects with 403 when
//! [`AccessSubject::has_permission`] is false for its permission name.

use assetdesk_core::error::CoreError;
use assetdesk_core::permissions::{self, AccessSubject, HeldPermission, PermissionRef};
use assetdesk_db::repositories::{PermissionRepo, UserRepo};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The authenticated caller plus their direct permission set.
///
/// Rejects with 401 if the token's user no longer exists or is inactive.
#[derive(Debug, Clone)]
pub struct CurrentSubject(pub AccessSubject);

impl FromRequestParts<AppState> for CurrentSubject {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let subject = load_subject(state, &auth).await?;
        Ok(CurrentSubject(subject))
    }
}

/// Build an [`AccessSubject`] for `auth`.
///
/// Permissions are only read when the store is provisioned.
pub async fn load_subject(state: &AppState, auth: &AuthUser) -> AppResult<AccessSubject> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Account is no longer active".into()))
        })?;

    let held = if state.permission_store.is_ready() {
        PermissionRepo::list_for_user(&state.pool, user.id)
            .await?
            .iter()
            .map(HeldPermission::from)
            .collect()
    } else {
        Vec::new()
    };

    Ok(AccessSubject {
        user_id: user.id,
        username: user.username,
        permissions: held,
    })
}

/// Reject unless `subject` passes the permission check for `name`.
pub fn ensure_permission(state: &AppState, subject: &AccessSubject, name: &str) -> AppResult<()> {
    if subject.has_permission(state.permission_store, &PermissionRef::name(name)) {
        Ok(())
    } else {
        tracing::debug!(user_id = subject.user_id, permission = name, "Permission denied");
        Err(AppError::Core(CoreError::Forbidden(format!(
            "Missing permission: {name}"
        ))))
    }
}

macro_rules! require_permission {
    ($(#[$meta:meta])* $name:ident => $permission:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub AccessSubject);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let CurrentSubject(subject) =
                    CurrentSubject::from_request_parts(parts, state).await?;
                ensure_permission(state, &subject, $permission)?;
                Ok($name(subject))
            }
        }
    };
}

require_permission!(
    /// Requires `user-manage`.
    RequireUserManage => permissions::USER_MANAGE
);
require_permission!(
    /// Requires `asset-view`.
    RequireAssetView => permissions::ASSET_VIEW
);
require_permission!(RequireAssetCreate => permissions::ASSET_CREATE);
require_permission!(RequireAssetEdit => permissions::ASSET_EDIT);
require_permission!(RequireAssetDelete => permissions::ASSET_DELETE);
require_permission!(
    /// Requires `asset-approve`. Covers approve, reject, restore and bulk approve.
    RequireAssetApprove => permissions::ASSET_APPROVE
);
require_permission!(RequireAssetReview => permissions::ASSET_REVIEW);
require_permission!(
    /// Requires `asset-manage` (categories, locations, regions).
    RequireAssetManage => permissions::ASSET_MANAGE
);
