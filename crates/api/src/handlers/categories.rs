//! Handlers for asset categories.

use assetdesk_core::types::DbId;
use assetdesk_core::validation::validate;
use assetdesk_db::models::asset_category::{
    AssetCategory, CreateAssetCategory, UpdateAssetCategory,
};
use assetdesk_db::repositories::AssetCategoryRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::not_found;
use crate::middleware::permissions::{RequireAssetManage, RequireAssetView};
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// GET /api/v1/assets-management/categories
pub async fn list(
    State(state): State<AppState>,
    RequireAssetView(_subject): RequireAssetView,
) -> AppResult<Json<DataResponse<Vec<AssetCategory>>>> {
    let data = AssetCategoryRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/assets-management/categories
///
/// Names are unique; a duplicate surfaces as 409 through `uq_asset_categories_name`.
pub async fn create(
    State(state): State<AppState>,
    RequireAssetManage(_subject): RequireAssetManage,
    Json(input): Json<CategoryRequest>,
) -> AppResult<(StatusCode, Json<ActionResponse<AssetCategory>>)> {
    validate(&input)?;
    let create = CreateAssetCategory {
        name: input.name.trim().to_string(),
        description: input.description,
    };
    let category = AssetCategoryRepo::create(&state.pool, &create).await?;
    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::with_data("Category created successfully", category)),
    ))
}

/// PUT /api/v1/assets-management/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAssetManage(_subject): RequireAssetManage,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ActionResponse<AssetCategory>>> {
    validate(&input)?;
    let patch = UpdateAssetCategory {
        name: input.name.map(|n| n.trim().to_string()),
        description: input.description,
    };
    let category = AssetCategoryRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| not_found("AssetCategory", id))?;
    Ok(Json(ActionResponse::with_data("Category updated successfully", category)))
}

/// DELETE /api/v1/assets-management/categories/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAssetManage(_subject): RequireAssetManage,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse>> {
    if !AssetCategoryRepo::delete(&state.pool, id).await? {
        return Err(not_found("AssetCategory", id).into());
    }
    tracing::info!(category_id = id, "Asset category deleted");
    Ok(Json(ActionResponse::ok("Category deleted successfully")))
}
