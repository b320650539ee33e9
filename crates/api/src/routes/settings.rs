//! Route definitions for the `/settings` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{permissions, users};
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// All routes require `user-manage` (enforced by handler extractors).
///
/// ```text
/// GET    /permissions                       -> permissions::list
/// GET    /users                             -> index
/// POST   /users                             -> create
/// POST   /users/store                       -> store (legacy upsert)
/// POST   /users/bulk-toggle-status          -> bulk_toggle_status
/// GET    /users/{id}                        -> show
/// PUT    /users/{id}                        -> update
/// DELETE /users/{id}                        -> destroy
/// POST   /users/{id}/toggle-status          -> toggle_status
/// POST   /users/{id}/reset-password         -> reset_password
/// GET    /users/{id}/permissions            -> permissions
/// POST   /users/{id}/assign-permissions     -> assign_permissions
/// POST   /users/{id}/grant-permission       -> grant_permission
/// POST   /users/{id}/revoke-permission      -> revoke_permission
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/permissions", get(permissions::list))
        .route("/users", get(users::index).post(users::create))
        .route("/users/store", post(users::store))
        .route("/users/bulk-toggle-status", post(users::bulk_toggle_status))
        .route(
            "/users/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
        .route("/users/{id}/toggle-status", post(users::toggle_status))
        .route("/users/{id}/reset-password", post(users::reset_password))
        .route("/users/{id}/permissions", get(users::permissions))
        .route("/users/{id}/assign-permissions", post(users::assign_permissions))
        .route("/users/{id}/grant-permission", post(users::grant_permission))
        .route("/users/{id}/revoke-permission", post(users::revoke_permission))
}
