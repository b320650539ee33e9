//! Maintenance records attached to an asset.

use assetdesk_core::error::FieldErrors;
use assetdesk_core::maintenance::{ensure_can_complete, validate_status_change, MaintenanceStatus};
use assetdesk_core::types::DbId;
use assetdesk_core::validation::{finish, push_error};
use assetdesk_db::models::maintenance::{CreateMaintenance, Maintenance, UpdateMaintenance};
use assetdesk_db::repositories::{AssetItemRepo, AssetRepo, MaintenanceRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::{field_errors, not_found};
use crate::middleware::permissions::RequireAssetEdit;
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    pub asset_item_id: Option<DbId>,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The maintenance type field is required."))]
    pub maintenance_type: String,
    pub description: Option<String>,
    pub scheduled_for: Option<NaiveDate>,
    #[validate(range(min = 0, message = "The cost must not be negative."))]
    pub cost_cents: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMaintenanceRequest {
    pub asset_item_id: Option<DbId>,
    #[validate(length(min = 1, max = 100, message = "The maintenance type field is required."))]
    pub maintenance_type: Option<String>,
    pub description: Option<String>,
    pub scheduled_for: Option<NaiveDate>,
    #[validate(range(min = 0, message = "The cost must not be negative."))]
    pub cost_cents: Option<i64>,
    pub status: Option<MaintenanceStatus>,
}

/// GET /api/v1/assets-management/{id}/maintenance
pub async fn list(
    State(state): State<AppState>,
    RequireAssetEdit(_subject): RequireAssetEdit,
    Path(asset_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Maintenance>>>> {
    ensure_asset(&state, asset_id).await?;
    let data = MaintenanceRepo::list_for_asset(&state.pool, asset_id).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/assets-management/{id}/maintenance
///
/// New records start `scheduled`.
pub async fn create(
    State(state): State<AppState>,
    RequireAssetEdit(subject): RequireAssetEdit,
    Path(asset_id): Path<DbId>,
    Json(input): Json<CreateMaintenanceRequest>,
) -> AppResult<(StatusCode, Json<ActionResponse<Maintenance>>)> {
    ensure_asset(&state, asset_id).await?;

    let mut errors = field_errors(&input);
    check_item(&state, asset_id, input.asset_item_id, &mut errors).await?;
    finish(errors)?;

    let create = CreateMaintenance {
        asset_item_id: input.asset_item_id,
        maintenance_type: input.maintenance_type.trim().to_string(),
        description: input.description,
        scheduled_for: input.scheduled_for,
        cost_cents: input.cost_cents,
    };
    let record =
        MaintenanceRepo::create(&state.pool, asset_id, &create, Some(subject.user_id)).await?;
    tracing::info!(asset_id, maintenance_id = record.id, "Maintenance scheduled");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::with_data("Maintenance record created successfully", record)),
    ))
}

/// PUT /api/v1/assets-management/maintenance/{id}
///
/// Closed records cannot be reopened and `in_progress` cannot return to
/// `scheduled`.
pub async fn update(
    State(state): State<AppState>,
    RequireAssetEdit(_subject): RequireAssetEdit,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMaintenanceRequest>,
) -> AppResult<Json<ActionResponse<Maintenance>>> {
    let current = find_record(&state, id).await?;

    let mut errors = field_errors(&input);
    check_item(&state, current.asset_id, input.asset_item_id, &mut errors).await?;
    finish(errors)?;

    if let Some(next) = input.status {
        validate_status_change(current.maintenance_status()?, next)?;
    }

    let patch = UpdateMaintenance {
        asset_item_id: input.asset_item_id,
        maintenance_type: input.maintenance_type.map(|t| t.trim().to_string()),
        description: input.description,
        scheduled_for: input.scheduled_for,
        cost_cents: input.cost_cents,
        status: input.status,
    };
    let record = MaintenanceRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| not_found("Maintenance", id))?;
    Ok(Json(ActionResponse::with_data("Maintenance record updated successfully", record)))
}

/// POST /api/v1/assets-management/maintenance/{id}/mark-completed
pub async fn mark_completed(
    State(state): State<AppState>,
    RequireAssetEdit(subject): RequireAssetEdit,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse<Maintenance>>> {
    let current = find_record(&state, id).await?;
    ensure_can_complete(current.maintenance_status()?)?;

    // A concurrent close between the read and the update leaves no row to return.
    let record = match MaintenanceRepo::mark_completed(&state.pool, id).await? {
        Some(record) => record,
        None => {
            let latest = find_record(&state, id).await?;
            ensure_can_complete(latest.maintenance_status()?)?;
            return Err(not_found("Maintenance", id).into());
        }
    };
    tracing::info!(maintenance_id = id, completed_by = subject.user_id, "Maintenance completed");
    Ok(Json(ActionResponse::with_data("Maintenance marked as completed", record)))
}

/// DELETE /api/v1/assets-management/maintenance/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAssetEdit(_subject): RequireAssetEdit,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse>> {
    if !MaintenanceRepo::delete(&state.pool, id).await? {
        return Err(not_found("Maintenance", id).into());
    }
    Ok(Json(ActionResponse::ok("Maintenance record deleted successfully")))
}

async fn ensure_asset(state: &AppState, asset_id: DbId) -> AppResult<()> {
    if AssetRepo::find_by_id(&state.pool, asset_id).await?.is_none() {
        return Err(not_found("Asset", asset_id).into());
    }
    Ok(())
}

async fn find_record(state: &AppState, id: DbId) -> AppResult<Maintenance> {
    Ok(MaintenanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Maintenance", id))?)
}

/// The referenced item must exist and belong to the same asset.
async fn check_item(
    state: &AppState,
    asset_id: DbId,
    item_id: Option<DbId>,
    errors: &mut FieldErrors,
) -> AppResult<()> {
    let Some(item_id) = item_id else {
        return Ok(());
    };
    match AssetItemRepo::find_by_id(&state.pool, item_id).await? {
        Some(item) if item.asset_id == asset_id => {}
        _ => push_error(errors, "asset_item_id", "The selected item is invalid."),
    }
    Ok(())
}
