//! Self-service profile for the authenticated user.

use assetdesk_core::error::FieldErrors;
use assetdesk_core::permissions::PermissionStoreState;
use assetdesk_core::validation::{finish, push_error};
use assetdesk_db::models::permission::PermissionSummary;
use assetdesk_db::models::user::{UpdateProfile, User, UserResponse};
use assetdesk_db::repositories::{PermissionRepo, UserRepo};
use axum::extract::{OriginalUri, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::handlers::{field_errors, not_found};
use crate::middleware::permissions::CurrentSubject;
use crate::response::{ActionResponse, Page};
use crate::state::AppState;

/// Attach the user's permissions, or none when the store is unprovisioned.
pub(crate) async fn user_with_permissions(
    state: &AppState,
    user: User,
) -> AppResult<UserResponse> {
    let permissions = match state.permission_store {
        PermissionStoreState::Ready => PermissionRepo::list_for_user(&state.pool, user.id)
            .await?
            .iter()
            .map(PermissionSummary::from)
            .collect(),
        PermissionStoreState::Unprovisioned => Vec::new(),
    };
    Ok(UserResponse::from_user(user, permissions))
}

#[derive(Debug, Serialize)]
pub struct ProfileProps {
    pub user: UserResponse,
    pub is_admin: bool,
    pub permissions: Vec<String>,
}

/// GET /api/v1/profile
pub async fn show(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Page<ProfileProps>>> {
    let user = UserRepo::find_by_id(&state.pool, subject.user_id)
        .await?
        .ok_or_else(|| not_found("User", subject.user_id))?;
    let props = ProfileProps {
        user: user_with_permissions(&state, user).await?,
        is_admin: subject.is_admin(state.permission_store),
        permissions: subject.permission_names(),
    };
    Ok(Json(Page::new("Profile/Edit", props, uri.to_string())))
}

/// Request body for `PATCH /profile`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: Option<String>,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 255, message = "The title field is required."))]
    pub title: Option<String>,
    pub current_password: Option<String>,
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: Option<String>,
}

/// PATCH /api/v1/profile
///
/// Changing the password requires `current_password`.
pub async fn update(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<ActionResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, subject.user_id)
        .await?
        .ok_or_else(|| not_found("User", subject.user_id))?;

    let mut errors: FieldErrors = field_errors(&input);
    if let Some(email) = input.email.as_deref() {
        if UserRepo::email_taken(&state.pool, email, Some(user.id)).await? {
            push_error(&mut errors, "email", "The email has already been taken.");
        }
    }
    if input.password.is_some() {
        let current_ok = match input.current_password.as_deref() {
            Some(current) => verify_password(current, &user.password_hash)
                .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?,
            None => false,
        };
        if !current_ok {
            push_error(
                &mut errors,
                "current_password",
                "The provided password does not match your current password.",
            );
        }
    }
    finish(errors)?;

    let password_hash = input
        .password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let patch = UpdateProfile {
        name: input.name,
        email: input.email,
        title: input.title,
        password_hash,
    };
    let password_changed = patch.password_hash.is_some();
    let updated = UserRepo::update_profile(&state.pool, user.id, &patch)
        .await?
        .ok_or_else(|| not_found("User", user.id))?;
    if password_changed {
        tracing::info!(user_id = user.id, "Password changed via profile");
    }

    let response = user_with_permissions(&state, updated).await?;
    Ok(Json(ActionResponse::with_data("Profile updated successfully.", response)))
}

