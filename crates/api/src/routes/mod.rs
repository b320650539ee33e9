pub mod assets;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod profile;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
///
/// /dashboard                                       dashboard page (auth)
/// /profile                                         show, update own profile (auth)
///
/// /settings/permissions                            permission catalogue
/// /settings/users                                  list, create
/// /settings/users/store                            legacy create-or-update
/// /settings/users/bulk-toggle-status               bulk activate/deactivate
/// /settings/users/{id}                             show, update, delete
/// /settings/users/{id}/...                         status, password, permissions
///
/// /assets-management                               list, create
/// /assets-management/approvals                     approvals queue
/// /assets-management/bulk-approve                  approve many
/// /assets-management/{id}                          show, update, delete
/// /assets-management/{id}/{approve,reject,review,restore}
/// /assets-management/{id}/{history,items,documents,maintenance}
/// /assets-management/{items,categories,locations,regions,documents,maintenance}/...
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/dashboard", dashboard::router())
        .nest("/profile", profile::router())
        .nest("/settings", settings::router())
        .nest("/assets-management", assets::router())
}
