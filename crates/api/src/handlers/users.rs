//! Handlers for `/settings/users`.
//!
//! All handlers require `user-manage` via [`RequireUserManage`].

use std::collections::HashMap;

use assetdesk_core::error::{CoreError, FieldErrors};
use assetdesk_core::pagination::PageRequest;
use assetdesk_core::permissions::PermissionRef;
use assetdesk_core::types::DbId;
use assetdesk_core::validation::{finish, push_error};
use assetdesk_db::models::common::Paginated;
use assetdesk_db::models::permission::{Permission, PermissionSummary};
use assetdesk_db::models::user::{CreateUser, UpdateUser, User, UserFilter, UserResponse};
use assetdesk_db::repositories::{PermissionRepo, UserRepo};
use assetdesk_events::WelcomeNotification;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::handlers::profile::user_with_permissions;
use crate::handlers::{field_errors, not_found};
use crate::middleware::permissions::RequireUserManage;
use crate::query::UserListParams;
use crate::response::{ActionResponse, DataResponse, Page};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body shared by create, update and the legacy upsert.
///
/// Missing strings default to empty so they surface as field errors rather
/// than a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserForm {
    /// Only read by the legacy upsert.
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The username field is required."))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The title field is required."))]
    pub title: String,
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Permission ids. On update `None` keeps the current set.
    #[serde(default)]
    pub permissions: Option<Vec<DbId>>,
}

impl UserForm {
    /// A blank password means "not supplied".
    fn normalized(mut self) -> Self {
        self.password = self.password.filter(|p| !p.is_empty());
        self.email = self.email.trim().to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct BulkToggleStatusRequest {
    #[serde(default)]
    pub user_ids: Vec<DbId>,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignPermissionsRequest {
    #[serde(default)]
    pub permissions: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct PermissionChangeRequest {
    pub permission: PermissionRef,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct UserIndexProps {
    pub users: Paginated<UserResponse>,
    pub filters: UserListParams,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct UserEditProps {
    pub user: UserResponse,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct PermissionChange {
    pub changed: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/settings/users
pub async fn index(
    State(state): State<AppState>,
    RequireUserManage(_subject): RequireUserManage,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<Page<UserIndexProps>>> {
    let filter = UserFilter {
        search: params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        is_active: params.is_active()?,
    };
    let page = PageRequest::new(params.page, params.per_page);

    let (users, total) = UserRepo::list(&state.pool, &filter, page).await?;
    let users = responses_for(&state, users).await?;

    let props = UserIndexProps {
        users: Paginated::new(users, total, page),
        filters: params,
        permissions: all_permissions(&state).await?,
    };
    Ok(Json(Page::new("User/Index", props, uri.to_string())))
}

/// GET /api/v1/settings/users/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireUserManage(_subject): RequireUserManage,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<DbId>,
) -> AppResult<Json<Page<UserEditProps>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    let props = UserEditProps {
        user: user_with_permissions(&state, user).await?,
        permissions: all_permissions(&state).await?,
    };
    Ok(Json(Page::new("User/Edit", props, uri.to_string())))
}

/// POST /api/v1/settings/users
///
/// Create a user, attach permissions, and queue the welcome notification.
pub async fn create(
    State(state): State<AppState>,
    RequireUserManage(subject): RequireUserManage,
    Json(form): Json<UserForm>,
) -> AppResult<(StatusCode, Json<ActionResponse<UserResponse>>)> {
    let user = create_user(&state, form.normalized()).await?;
    tracing::info!(user_id = user.id, created_by = subject.user_id, "User created");
    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::with_data("User created successfully", user)),
    ))
}

/// PUT /api/v1/settings/users/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireUserManage(subject): RequireUserManage,
    Path(id): Path<DbId>,
    Json(form): Json<UserForm>,
) -> AppResult<Json<ActionResponse<UserResponse>>> {
    let form = form.normalized();
    let permissions = form.permissions.clone();
    let user = update_user(&state, id, form, permissions).await?;
    tracing::info!(user_id = id, updated_by = subject.user_id, "User updated");
    Ok(Json(ActionResponse::with_data("User updated successfully", user)))
}

/// POST /api/v1/settings/users/store
///
/// Compatibility upsert: updates when `id` is present, creates otherwise.
/// A missing `permissions` list clears the user's permissions.
pub async fn store(
    State(state): State<AppState>,
    RequireUserManage(subject): RequireUserManage,
    Json(form): Json<UserForm>,
) -> AppResult<Json<ActionResponse<UserResponse>>> {
    let form = form.normalized();
    match form.id {
        Some(id) => {
            let permissions = Some(form.permissions.clone().unwrap_or_default());
            let user = update_user(&state, id, form, permissions).await?;
            tracing::info!(user_id = id, updated_by = subject.user_id, "User updated via store");
            Ok(Json(ActionResponse::with_data("User updated successfully", user)))
        }
        None => {
            let user = create_user(&state, form).await?;
            tracing::info!(user_id = user.id, created_by = subject.user_id, "User created via store");
            Ok(Json(ActionResponse::with_data("User created successfully", user)))
        }
    }
}

/// DELETE /api/v1/settings/users/{id}
///
/// Deleting the caller's own account is refused before any lookup.
pub async fn destroy(
    State(state): State<AppState>,
    RequireUserManage(subject): RequireUserManage,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse>> {
    if id == subject.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot delete your own account.".into(),
        )));
    }

    if !UserRepo::delete(&state.pool, id).await? {
        return Err(not_found("User", id).into());
    }
    tracing::info!(user_id = id, deleted_by = subject.user_id, "User deleted");
    Ok(Json(ActionResponse::ok("User deleted successfully.")))
}

/// POST /api/v1/settings/users/{id}/toggle-status
pub async fn toggle_status(
    State(state): State<AppState>,
    RequireUserManage(_subject): RequireUserManage,
    Path(id): Path<DbId>,
    Json(input): Json<ToggleStatusRequest>,
) -> AppResult<Json<ActionResponse<UserResponse>>> {
    let user = UserRepo::set_active(&state.pool, id, input.is_active)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    let message = format!("User {} successfully", status_text(input.is_active));
    let user = user_with_permissions(&state, user).await?;
    Ok(Json(ActionResponse::with_data(message, user)))
}

/// POST /api/v1/settings/users/bulk-toggle-status
///
/// All-or-nothing: one unknown id fails the whole request.
pub async fn bulk_toggle_status(
    State(state): State<AppState>,
    RequireUserManage(subject): RequireUserManage,
    Json(input): Json<BulkToggleStatusRequest>,
) -> AppResult<Json<ActionResponse>> {
    if input.user_ids.is_empty() {
        return Err(CoreError::field("user_ids", "The user ids field is required.").into());
    }
    let count = UserRepo::bulk_set_active(&state.pool, &input.user_ids, input.is_active).await?;
    tracing::info!(count, is_active = input.is_active, actor_id = subject.user_id, "Bulk status change");
    Ok(Json(ActionResponse::ok(format!(
        "{count} users {} successfully",
        status_text(input.is_active)
    ))))
}

/// POST /api/v1/settings/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireUserManage(subject): RequireUserManage,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<ActionResponse>> {
    finish(field_errors(&input))?;
    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::update_password(&state.pool, id, &hashed).await? {
        return Err(not_found("User", id).into());
    }
    tracing::info!(user_id = id, reset_by = subject.user_id, "Password reset");
    Ok(Json(ActionResponse::ok("Password reset successfully.")))
}

/// GET /api/v1/settings/users/{id}/permissions
pub async fn permissions(
    State(state): State<AppState>,
    RequireUserManage(_subject): RequireUserManage,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PermissionSummary>>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    let user = user_with_permissions(&state, user).await?;
    Ok(Json(DataResponse {
        data: user.permissions,
    }))
}

/// POST /api/v1/settings/users/{id}/assign-permissions
///
/// Replace the user's whole permission set.
pub async fn assign_permissions(
    State(state): State<AppState>,
    RequireUserManage(subject): RequireUserManage,
    Path(id): Path<DbId>,
    Json(input): Json<AssignPermissionsRequest>,
) -> AppResult<Json<ActionResponse<Vec<PermissionSummary>>>> {
    ensure_store_ready(&state)?;
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;

    let mut errors = FieldErrors::new();
    check_permission_ids(&state, &input.permissions, &mut errors).await?;
    finish(errors)?;

    PermissionRepo::sync(&state.pool, id, &input.permissions).await?;
    tracing::info!(user_id = id, count = input.permissions.len(), actor_id = subject.user_id, "Permissions assigned");

    let held = PermissionRepo::list_for_user(&state.pool, id)
        .await?
        .iter()
        .map(PermissionSummary::from)
        .collect();
    Ok(Json(ActionResponse::with_data("Permissions updated successfully", held)))
}

/// POST /api/v1/settings/users/{id}/grant-permission
///
/// Only adds the row when the user does not already hold it directly.
pub async fn grant_permission(
    State(state): State<AppState>,
    RequireUserManage(subject): RequireUserManage,
    Path(id): Path<DbId>,
    Json(input): Json<PermissionChangeRequest>,
) -> AppResult<Json<ActionResponse<PermissionChange>>> {
    let (user, permission) = resolve_change_target(&state, id, &input.permission).await?;
    let changed = PermissionRepo::grant(&state.pool, user.id, permission.id).await?;
    tracing::info!(user_id = id, permission = %permission.name, changed, actor_id = subject.user_id, "Permission granted");
    let message = if changed {
        format!("Granted {}", permission.name)
    } else {
        format!("User already holds {}", permission.name)
    };
    Ok(Json(ActionResponse::with_data(message, PermissionChange { changed })))
}

/// POST /api/v1/settings/users/{id}/revoke-permission
pub async fn revoke_permission(
    State(state): State<AppState>,
    RequireUserManage(subject): RequireUserManage,
    Path(id): Path<DbId>,
    Json(input): Json<PermissionChangeRequest>,
) -> AppResult<Json<ActionResponse<PermissionChange>>> {
    let (user, permission) = resolve_change_target(&state, id, &input.permission).await?;
    let changed = PermissionRepo::revoke(&state.pool, user.id, permission.id).await?;
    tracing::info!(user_id = id, permission = %permission.name, changed, actor_id = subject.user_id, "Permission revoked");
    let message = if changed {
        format!("Revoked {}", permission.name)
    } else {
        format!("User does not hold {}", permission.name)
    };
    Ok(Json(ActionResponse::with_data(message, PermissionChange { changed })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn status_text(is_active: bool) -> &'static str {
    if is_active {
        "activated"
    } else {
        "deactivated"
    }
}

fn ensure_store_ready(state: &AppState) -> AppResult<()> {
    if state.permission_store.is_ready() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Conflict(
            "Permissions are not provisioned on this server".into(),
        )))
    }
}

async fn all_permissions(state: &AppState) -> AppResult<Vec<Permission>> {
    if state.permission_store.is_ready() {
        Ok(PermissionRepo::list_all(&state.pool).await?)
    } else {
        Ok(Vec::new())
    }
}

/// Attach permissions to a batch of users with one query.
pub(crate) async fn responses_for(
    state: &AppState,
    users: Vec<User>,
) -> AppResult<Vec<UserResponse>> {
    let mut by_user: HashMap<DbId, Vec<PermissionSummary>> = HashMap::new();
    if state.permission_store.is_ready() && !users.is_empty() {
        let ids: Vec<DbId> = users.iter().map(|u| u.id).collect();
        for row in PermissionRepo::list_for_users(&state.pool, &ids).await? {
            by_user.entry(row.user_id).or_default().push(row.into());
        }
    }
    Ok(users
        .into_iter()
        .map(|u| {
            let perms = by_user.remove(&u.id).unwrap_or_default();
            UserResponse::from_user(u, perms)
        })
        .collect())
}

async fn check_permission_ids(
    state: &AppState,
    ids: &[DbId],
    errors: &mut FieldErrors,
) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    if !state.permission_store.is_ready() {
        push_error(errors, "permissions", "Permissions are not available.");
        return Ok(());
    }
    for missing in PermissionRepo::missing_ids(&state.pool, ids).await? {
        push_error(
            errors,
            "permissions",
            format!("The selected permission {missing} is invalid."),
        );
    }
    Ok(())
}

/// Shared checks for create and update. `existing` is the id being edited.
async fn validate_form(state: &AppState, form: &UserForm, existing: Option<DbId>) -> AppResult<()> {
    let mut errors = field_errors(form);

    if existing.is_none() && form.password.is_none() {
        push_error(&mut errors, "password", "The password field is required.");
    }
    if !errors.contains_key("email")
        && UserRepo::email_taken(&state.pool, &form.email, existing).await?
    {
        push_error(&mut errors, "email", "The email has already been taken.");
    }
    if let Some(ids) = form.permissions.as_deref() {
        check_permission_ids(state, ids, &mut errors).await?;
    }

    Ok(finish(errors)?)
}

async fn create_user(state: &AppState, form: UserForm) -> AppResult<UserResponse> {
    validate_form(state, &form, None).await?;

    let password = form.password.unwrap_or_default();
    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let input = CreateUser {
        name: form.name,
        username: form.username,
        email: form.email,
        password_hash,
        title: form.title,
        is_active: form.is_active.unwrap_or(true),
    };
    let permission_ids = form.permissions.unwrap_or_default();
    let user = if state.permission_store.is_ready() {
        UserRepo::create_with_permissions(&state.pool, &input, &permission_ids).await?
    } else {
        UserRepo::create(&state.pool, &input).await?
    };

    state.notifier.notify(WelcomeNotification::new(
        user.id,
        user.name.clone(),
        user.username.clone(),
        user.email.clone(),
        Some(password),
    ));

    user_with_permissions(state, user).await
}

async fn update_user(
    state: &AppState,
    id: DbId,
    form: UserForm,
    permissions: Option<Vec<DbId>>,
) -> AppResult<UserResponse> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    validate_form(state, &form, Some(id)).await?;

    let password_hash = form
        .password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let input = UpdateUser {
        name: form.name,
        username: form.username,
        email: form.email,
        title: form.title,
        is_active: form.is_active,
        password_hash,
    };
    let permissions = permissions.filter(|_| state.permission_store.is_ready());
    let user = UserRepo::update_with_permissions(&state.pool, id, &input, permissions.as_deref())
        .await?
        .ok_or_else(|| not_found("User", id))?;

    user_with_permissions(state, user).await
}

async fn resolve_change_target(
    state: &AppState,
    user_id: DbId,
    target: &PermissionRef,
) -> AppResult<(User, Permission)> {
    ensure_store_ready(state)?;
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| not_found("User", user_id))?;
    let permission = PermissionRepo::resolve(&state.pool, target)
        .await?
        .ok_or_else(|| CoreError::field("permission", "The selected permission is invalid."))?;
    Ok((user, permission))
}
