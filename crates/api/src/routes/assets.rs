//! Route definitions for the `/assets-management` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{asset_items, assets, categories, documents, locations, maintenance};
use crate::state::AppState;

/// Routes mounted at `/assets-management`.
///
/// Static segments (`approvals`, `categories`, ...) take priority over `{id}`.
///
/// ```text
/// GET    /                                  -> assets::index
/// POST   /                                  -> assets::store
/// GET    /approvals                         -> assets::approvals
/// POST   /bulk-approve                      -> assets::bulk_approve
/// GET    /{id}                              -> assets::show
/// PUT    /{id}                              -> assets::update
/// DELETE /{id}                              -> assets::destroy
/// POST   /{id}/approve                      -> assets::approve
/// POST   /{id}/reject                       -> assets::reject
/// POST   /{id}/review                       -> assets::review
/// POST   /{id}/restore                      -> assets::restore
/// GET    /{id}/history                      -> assets::history
///
/// GET    /{id}/items                        -> asset_items::list
/// POST   /{id}/items                        -> asset_items::create
/// PUT    /items/{id}                        -> asset_items::update
/// DELETE /items/{id}                        -> asset_items::delete
///
/// GET    /categories                        -> categories::list
/// POST   /categories                        -> categories::create
/// PUT    /categories/{id}                   -> categories::update
/// DELETE /categories/{id}                   -> categories::delete
///
/// GET    /locations                         -> locations::list
/// POST   /locations                         -> locations::create
/// GET    /locations/{id}/sub-locations      -> locations::sub_locations
/// PUT    /locations/{id}                    -> locations::update
/// DELETE /locations/{id}                    -> locations::delete
/// GET    /regions                           -> locations::regions
/// POST   /regions                           -> locations::create_region
///
/// POST   /{id}/documents                    -> documents::upload
/// GET    /{id}/documents                    -> documents::list
/// GET    /documents/{id}/download           -> documents::download
/// DELETE /documents/{id}                    -> documents::delete
///
/// GET    /{id}/maintenance                  -> maintenance::list
/// POST   /{id}/maintenance                  -> maintenance::create
/// PUT    /maintenance/{id}                  -> maintenance::update
/// DELETE /maintenance/{id}                  -> maintenance::delete
/// POST   /maintenance/{id}/mark-completed   -> maintenance::mark_completed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::index).post(assets::store))
        .route("/approvals", get(assets::approvals))
        .route("/bulk-approve", post(assets::bulk_approve))
        // Reference data
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/locations", get(locations::list).post(locations::create))
        .route("/locations/{id}", put(locations::update).delete(locations::delete))
        .route("/locations/{id}/sub-locations", get(locations::sub_locations))
        .route("/regions", get(locations::regions).post(locations::create_region))
        // Child records addressed by their own id
        .route("/items/{id}", put(asset_items::update).delete(asset_items::delete))
        .route("/documents/{id}", axum::routing::delete(documents::delete))
        .route("/documents/{id}/download", get(documents::download))
        .route(
            "/maintenance/{id}",
            put(maintenance::update).delete(maintenance::delete),
        )
        .route(
            "/maintenance/{id}/mark-completed",
            post(maintenance::mark_completed),
        )
        // Single asset
        .route(
            "/{id}",
            get(assets::show).put(assets::update).delete(assets::destroy),
        )
        .route("/{id}/approve", post(assets::approve))
        .route("/{id}/reject", post(assets::reject))
        .route("/{id}/review", post(assets::review))
        .route("/{id}/restore", post(assets::restore))
        .route("/{id}/history", get(assets::history))
        .route("/{id}/items", get(asset_items::list).post(asset_items::create))
        .route("/{id}/documents", get(documents::list).post(documents::upload))
        .route(
            "/{id}/maintenance",
            get(maintenance::list).post(maintenance::create),
        )
}
