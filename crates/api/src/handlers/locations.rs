//! Handlers for locations, sub-locations and regions.
//!
//! A location with a `parent_id` is a sub-location. Deleting a location
//! removes its sub-locations and detaches any assets placed there.

use assetdesk_core::error::{CoreError, FieldErrors};
use assetdesk_core::types::DbId;
use assetdesk_core::validation::{finish, push_error, validate};
use assetdesk_db::models::location::{CreateLocation, Location, Region, UpdateLocation};
use assetdesk_db::repositories::{LocationRepo, RegionRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::{field_errors, not_found};
use crate::middleware::permissions::RequireAssetManage;
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LocationRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    pub region_id: Option<DbId>,
    pub parent_id: Option<DbId>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: Option<String>,
    pub region_id: Option<DbId>,
    pub parent_id: Option<DbId>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegionRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// GET /api/v1/assets-management/locations
///
/// Top-level locations only.
pub async fn list(
    State(state): State<AppState>,
    RequireAssetManage(_subject): RequireAssetManage,
) -> AppResult<Json<DataResponse<Vec<Location>>>> {
    let data = LocationRepo::list_top_level(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/assets-management/locations/{id}/sub-locations
pub async fn sub_locations(
    State(state): State<AppState>,
    RequireAssetManage(_subject): RequireAssetManage,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Location>>>> {
    if LocationRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found("Location", id).into());
    }
    let data = LocationRepo::list_sub_locations(&state.pool, id).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/assets-management/locations
pub async fn create(
    State(state): State<AppState>,
    RequireAssetManage(_subject): RequireAssetManage,
    Json(input): Json<LocationRequest>,
) -> AppResult<(StatusCode, Json<ActionResponse<Location>>)> {
    let mut errors = field_errors(&input);
    check_references(&state, input.region_id, input.parent_id, &mut errors).await?;
    finish(errors)?;

    let create = CreateLocation {
        name: input.name.trim().to_string(),
        region_id: input.region_id,
        parent_id: input.parent_id,
    };
    let location = LocationRepo::create(&state.pool, &create).await?;
    tracing::info!(location_id = location.id, parent_id = ?location.parent_id, "Location created");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::with_data("Location created successfully", location)),
    ))
}

/// PUT /api/v1/assets-management/locations/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAssetManage(_subject): RequireAssetManage,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLocationRequest>,
) -> AppResult<Json<ActionResponse<Location>>> {
    let mut errors = field_errors(&input);
    if input.parent_id == Some(id) {
        push_error(&mut errors, "parent_id", "A location cannot be its own parent.");
    } else {
        check_references(&state, input.region_id, input.parent_id, &mut errors).await?;
    }
    finish(errors)?;

    let patch = UpdateLocation {
        name: input.name.map(|n| n.trim().to_string()),
        region_id: input.region_id,
        parent_id: input.parent_id,
    };
    let location = LocationRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| not_found("Location", id))?;
    Ok(Json(ActionResponse::with_data("Location updated successfully", location)))
}

/// DELETE /api/v1/assets-management/locations/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAssetManage(_subject): RequireAssetManage,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse>> {
    if !LocationRepo::delete(&state.pool, id).await? {
        return Err(not_found("Location", id).into());
    }
    tracing::info!(location_id = id, "Location deleted");
    Ok(Json(ActionResponse::ok("Location deleted successfully")))
}

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// GET /api/v1/assets-management/regions
pub async fn regions(
    State(state): State<AppState>,
    RequireAssetManage(_subject): RequireAssetManage,
) -> AppResult<Json<DataResponse<Vec<Region>>>> {
    let data = RegionRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/assets-management/regions
///
/// Returns the existing row when the name is already present.
pub async fn create_region(
    State(state): State<AppState>,
    RequireAssetManage(_subject): RequireAssetManage,
    Json(input): Json<RegionRequest>,
) -> AppResult<Json<ActionResponse<Region>>> {
    validate(&input)?;
    let name = input.name.trim();
    if name.is_empty() {
        return Err(CoreError::field("name", "The name field is required.").into());
    }
    let region = RegionRepo::create_or_get(&state.pool, name).await?;
    Ok(Json(ActionResponse::with_data("Region saved successfully", region)))
}

async fn check_references(
    state: &AppState,
    region_id: Option<DbId>,
    parent_id: Option<DbId>,
    errors: &mut FieldErrors,
) -> AppResult<()> {
    if let Some(region_id) = region_id {
        if RegionRepo::find_by_id(&state.pool, region_id).await?.is_none() {
            push_error(errors, "region_id", "The selected region is invalid.");
        }
    }
    if let Some(parent_id) = parent_id {
        if LocationRepo::find_by_id(&state.pool, parent_id).await?.is_none() {
            push_error(errors, "parent_id", "The selected parent location is invalid.");
        }
    }
    Ok(())
}
