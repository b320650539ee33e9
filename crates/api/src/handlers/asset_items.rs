//! Handlers for the items attached to an asset.

use assetdesk_core::error::FieldErrors;
use assetdesk_core::pagination::PageRequest;
use assetdesk_core::types::DbId;
use assetdesk_core::validation::{finish, push_error, validate_status_tag};
use assetdesk_db::models::asset_item::{
    AssetItem, AssetItemFilter, AssetItemWithCategory, CreateAssetItem, UpdateAssetItem,
};
use assetdesk_db::models::common::Paginated;
use assetdesk_db::repositories::{AssetCategoryRepo, AssetItemRepo, AssetRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::{field_errors, not_found};
use crate::middleware::permissions::{RequireAssetEdit, RequireAssetView};
use crate::query::ItemListParams;
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    pub category_id: Option<DbId>,
    #[validate(length(max = 255))]
    pub serial_number: Option<String>,
    #[validate(length(max = 255))]
    pub tag_no: Option<String>,
    #[validate(custom(function = "validate_status_tag"))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: Option<String>,
    pub category_id: Option<DbId>,
    #[validate(length(max = 255))]
    pub serial_number: Option<String>,
    #[validate(length(max = 255))]
    pub tag_no: Option<String>,
    #[validate(custom(function = "validate_status_tag"))]
    pub status: Option<String>,
}

/// GET /api/v1/assets-management/{id}/items
pub async fn list(
    State(state): State<AppState>,
    RequireAssetView(_subject): RequireAssetView,
    Path(asset_id): Path<DbId>,
    Query(params): Query<ItemListParams>,
) -> AppResult<Json<DataResponse<Paginated<AssetItemWithCategory>>>> {
    ensure_asset(&state, asset_id).await?;

    let filter = AssetItemFilter {
        asset_id: Some(asset_id),
        category_id: params.category_id,
        status: params.status.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
    };
    let page = PageRequest::new(params.page, params.per_page);
    let (items, total) = AssetItemRepo::list(&state.pool, &filter, page).await?;
    Ok(Json(DataResponse {
        data: Paginated::new(items, total, page),
    }))
}

/// POST /api/v1/assets-management/{id}/items
///
/// The repository stores `in_use` when no status is given.
pub async fn create(
    State(state): State<AppState>,
    RequireAssetEdit(_subject): RequireAssetEdit,
    Path(asset_id): Path<DbId>,
    Json(input): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ActionResponse<AssetItem>>)> {
    ensure_asset(&state, asset_id).await?;

    let mut errors = field_errors(&input);
    check_category(&state, input.category_id, &mut errors).await?;
    finish(errors)?;

    let create = CreateAssetItem {
        category_id: input.category_id,
        name: input.name,
        serial_number: input.serial_number,
        tag_no: input.tag_no,
        status: input.status.map(|s| s.trim().to_string()),
    };
    let item = AssetItemRepo::create(&state.pool, asset_id, &create).await?;
    tracing::info!(asset_id, item_id = item.id, "Asset item created");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::with_data("Item added successfully", item)),
    ))
}

/// PUT /api/v1/assets-management/items/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAssetEdit(_subject): RequireAssetEdit,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateItemRequest>,
) -> AppResult<Json<ActionResponse<AssetItem>>> {
    let mut errors = field_errors(&input);
    check_category(&state, input.category_id, &mut errors).await?;
    finish(errors)?;

    let patch = UpdateAssetItem {
        category_id: input.category_id,
        name: input.name,
        serial_number: input.serial_number,
        tag_no: input.tag_no,
        status: input.status.map(|s| s.trim().to_string()),
    };
    let item = AssetItemRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| not_found("AssetItem", id))?;
    Ok(Json(ActionResponse::with_data("Item updated successfully", item)))
}

/// DELETE /api/v1/assets-management/items/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAssetEdit(_subject): RequireAssetEdit,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse>> {
    if !AssetItemRepo::delete(&state.pool, id).await? {
        return Err(not_found("AssetItem", id).into());
    }
    tracing::info!(item_id = id, "Asset item deleted");
    Ok(Json(ActionResponse::ok("Item deleted successfully")))
}

async fn ensure_asset(state: &AppState, asset_id: DbId) -> AppResult<()> {
    if AssetRepo::find_by_id(&state.pool, asset_id).await?.is_none() {
        return Err(not_found("Asset", asset_id).into());
    }
    Ok(())
}

async fn check_category(
    state: &AppState,
    category_id: Option<DbId>,
    errors: &mut FieldErrors,
) -> AppResult<()> {
    if let Some(category_id) = category_id {
        if AssetCategoryRepo::find_by_id(&state.pool, category_id)
            .await?
            .is_none()
        {
            push_error(errors, "category_id", "The selected category is invalid.");
        }
    }
    Ok(())
}
