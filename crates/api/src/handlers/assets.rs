//! Handlers for `/assets-management`: asset CRUD and the approval workflow.

use std::collections::HashMap;

use assetdesk_core::asset_workflow::{AssetStatus, WorkflowAction};
use assetdesk_core::error::CoreError;
use assetdesk_core::pagination::PageRequest;
use assetdesk_core::types::DbId;
use assetdesk_core::validation::{finish, push_error};
use assetdesk_db::models::asset::{
    Asset, AssetFilter, AssetTransition, AssetWithItems, CreateAsset, UpdateAsset,
};
use assetdesk_db::models::asset_category::AssetCategory;
use assetdesk_db::models::asset_item::AssetItemWithCategory;
use assetdesk_db::models::common::Paginated;
use assetdesk_db::models::document::AssetDocument;
use assetdesk_db::models::location::Location;
use assetdesk_db::models::maintenance::Maintenance;
use assetdesk_db::repositories::{
    AssetCategoryRepo, AssetItemRepo, AssetRepo, DocumentRepo, LocationRepo, MaintenanceRepo,
};
use axum::body::Bytes;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::{field_errors, not_found};
use crate::middleware::permissions::{
    RequireAssetApprove, RequireAssetCreate, RequireAssetDelete, RequireAssetEdit,
    RequireAssetReview, RequireAssetView,
};
use crate::query::AssetListParams;
use crate::response::{ActionResponse, DataResponse, Page};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssetRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The reference no field is required."))]
    pub reference_no: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    pub description: Option<String>,
    pub location_id: Option<DbId>,
    pub acquired_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAssetRequest {
    #[validate(length(min = 1, max = 255, message = "The reference no field is required."))]
    pub reference_no: Option<String>,
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub location_id: Option<DbId>,
    pub acquired_on: Option<NaiveDate>,
}

impl CreateAssetRequest {
    /// Trim identifying text so blank values fail validation.
    fn trimmed(mut self) -> Self {
        self.reference_no = self.reference_no.trim().to_string();
        self.name = self.name.trim().to_string();
        self
    }
}

impl UpdateAssetRequest {
    fn trimmed(mut self) -> Self {
        self.reference_no = self.reference_no.map(|r| r.trim().to_string());
        self.name = self.name.map(|n| n.trim().to_string());
        self
    }
}

/// Optional body of the single-asset workflow actions.
#[derive(Debug, Default, Deserialize)]
pub struct TransitionRequest {
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkApproveRequest {
    #[serde(default)]
    pub ids: Vec<DbId>,
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AssetIndexProps {
    pub assets: Paginated<AssetWithItems>,
    pub filters: AssetListParams,
    pub locations: Vec<Location>,
    pub categories: Vec<AssetCategory>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalsProps {
    pub assets: Paginated<AssetWithItems>,
    pub filters: AssetListParams,
}

#[derive(Debug, Serialize)]
pub struct AssetShowProps {
    pub asset: AssetWithItems,
    pub documents: Vec<AssetDocument>,
    pub maintenance: Vec<Maintenance>,
    pub history: Vec<AssetTransition>,
}

#[derive(Debug, Serialize)]
pub struct BulkApproveOutcome {
    pub requested: usize,
    pub approved: u64,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/v1/assets-management
pub async fn index(
    State(state): State<AppState>,
    RequireAssetView(_subject): RequireAssetView,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<AssetListParams>,
) -> AppResult<Json<Page<AssetIndexProps>>> {
    let filter = AssetFilter {
        search: params.search.clone(),
        statuses: params.status()?.map(|s| vec![s.as_str().to_string()]),
        location_id: params.location_id,
        item_status: params.item_status.clone(),
    };
    let page = PageRequest::new(params.page, params.per_page);
    let assets = list_with_items(&state, &filter, page).await?;

    let props = AssetIndexProps {
        assets,
        filters: params,
        locations: LocationRepo::list_top_level(&state.pool).await?,
        categories: AssetCategoryRepo::list(&state.pool).await?,
    };
    Ok(Json(Page::new("Assets/Index", props, uri.to_string())))
}

/// GET /api/v1/assets-management/approvals
///
/// The approvals queue: assets pending approval or restored. A `status`
/// filter narrows the queue to one of those two.
pub async fn approvals(
    State(state): State<AppState>,
    RequireAssetView(_subject): RequireAssetView,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<AssetListParams>,
) -> AppResult<Json<Page<ApprovalsProps>>> {
    let statuses: Vec<String> = match params.status()? {
        Some(status) if status.awaits_decision() => vec![status.as_str().to_string()],
        Some(other) => {
            return Err(CoreError::field(
                "status",
                format!("Status '{other}' is not part of the approvals queue."),
            )
            .into())
        }
        None => AssetStatus::AWAITING_DECISION
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
    };
    let filter = AssetFilter {
        search: params.search.clone(),
        statuses: Some(statuses),
        location_id: params.location_id,
        item_status: params.item_status.clone(),
    };
    let page = PageRequest::new(params.page, params.per_page);

    let props = ApprovalsProps {
        assets: list_with_items(&state, &filter, page).await?,
        filters: params,
    };
    Ok(Json(Page::new("Assets/Approvals", props, uri.to_string())))
}

/// GET /api/v1/assets-management/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAssetView(_subject): RequireAssetView,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<DbId>,
) -> AppResult<Json<Page<AssetShowProps>>> {
    let asset = find_asset(&state, id).await?;
    let items = AssetItemRepo::list_for_assets(&state.pool, &[id]).await?;

    let props = AssetShowProps {
        asset: AssetWithItems { asset, items },
        documents: DocumentRepo::list_for_asset(&state.pool, id).await?,
        maintenance: MaintenanceRepo::list_for_asset(&state.pool, id).await?,
        history: AssetRepo::list_transitions(&state.pool, id).await?,
    };
    Ok(Json(Page::new("Assets/Show", props, uri.to_string())))
}

/// GET /api/v1/assets-management/{id}/history
pub async fn history(
    State(state): State<AppState>,
    RequireAssetView(_subject): RequireAssetView,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AssetTransition>>>> {
    find_asset(&state, id).await?;
    let data = AssetRepo::list_transitions(&state.pool, id).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/assets-management
///
/// New assets always enter the approvals queue as `pending_approval`.
pub async fn store(
    State(state): State<AppState>,
    RequireAssetCreate(subject): RequireAssetCreate,
    Json(input): Json<CreateAssetRequest>,
) -> AppResult<(StatusCode, Json<ActionResponse<Asset>>)> {
    let input = input.trimmed();
    let mut errors = field_errors(&input);
    check_location(&state, input.location_id, &mut errors).await?;
    finish(errors)?;

    let create = CreateAsset {
        reference_no: input.reference_no,
        name: input.name,
        description: input.description,
        location_id: input.location_id,
        acquired_on: input.acquired_on,
    };
    let asset = AssetRepo::create(&state.pool, &create, Some(subject.user_id)).await?;
    tracing::info!(asset_id = asset.id, created_by = subject.user_id, "Asset created");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::with_data("Asset created successfully", asset)),
    ))
}

/// PUT /api/v1/assets-management/{id}
///
/// Edits descriptive fields only; the workflow status is untouched.
pub async fn update(
    State(state): State<AppState>,
    RequireAssetEdit(subject): RequireAssetEdit,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAssetRequest>,
) -> AppResult<Json<ActionResponse<Asset>>> {
    find_asset(&state, id).await?;

    let input = input.trimmed();
    let mut errors = field_errors(&input);
    check_location(&state, input.location_id, &mut errors).await?;
    finish(errors)?;

    let patch = UpdateAsset {
        reference_no: input.reference_no,
        name: input.name,
        description: input.description,
        location_id: input.location_id,
        acquired_on: input.acquired_on,
    };
    let asset = AssetRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| not_found("Asset", id))?;
    tracing::info!(asset_id = id, updated_by = subject.user_id, "Asset updated");
    Ok(Json(ActionResponse::with_data("Asset updated successfully", asset)))
}

/// DELETE /api/v1/assets-management/{id}
///
/// Items, maintenance, history and document rows cascade; stored document
/// files are removed afterwards.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAssetDelete(subject): RequireAssetDelete,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse>> {
    let documents = DocumentRepo::list_for_asset(&state.pool, id).await?;
    if !AssetRepo::delete(&state.pool, id).await? {
        return Err(not_found("Asset", id).into());
    }

    for doc in &documents {
        if let Err(e) = state.storage.delete(&doc.storage_key).await {
            tracing::warn!(document_id = doc.id, error = %e, "Failed to remove document file");
        }
    }
    tracing::info!(asset_id = id, deleted_by = subject.user_id, documents = documents.len(), "Asset deleted");
    Ok(Json(ActionResponse::ok("Asset deleted successfully.")))
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// POST /api/v1/assets-management/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    RequireAssetApprove(subject): RequireAssetApprove,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<ActionResponse<Asset>>> {
    transition(&state, id, WorkflowAction::Approve, subject.user_id, body).await
}

/// POST /api/v1/assets-management/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    RequireAssetApprove(subject): RequireAssetApprove,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<ActionResponse<Asset>>> {
    transition(&state, id, WorkflowAction::Reject, subject.user_id, body).await
}

/// POST /api/v1/assets-management/{id}/review
pub async fn review(
    State(state): State<AppState>,
    RequireAssetReview(subject): RequireAssetReview,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<ActionResponse<Asset>>> {
    transition(&state, id, WorkflowAction::Review, subject.user_id, body).await
}

/// POST /api/v1/assets-management/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    RequireAssetApprove(subject): RequireAssetApprove,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<ActionResponse<Asset>>> {
    transition(&state, id, WorkflowAction::Restore, subject.user_id, body).await
}

/// POST /api/v1/assets-management/bulk-approve
///
/// One unknown id rolls back the whole batch. Assets not awaiting approval
/// are skipped and not counted.
pub async fn bulk_approve(
    State(state): State<AppState>,
    RequireAssetApprove(subject): RequireAssetApprove,
    Json(input): Json<BulkApproveRequest>,
) -> AppResult<Json<ActionResponse<BulkApproveOutcome>>> {
    if input.ids.is_empty() {
        return Err(CoreError::field("ids", "The ids field is required.").into());
    }

    let approved = AssetRepo::bulk_approve(
        &state.pool,
        &input.ids,
        subject.user_id,
        input.comment.as_deref(),
    )
    .await?;

    let outcome = BulkApproveOutcome {
        requested: input.ids.len(),
        approved,
    };
    Ok(Json(ActionResponse::with_data(
        format!("{approved} assets approved successfully"),
        outcome,
    )))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn transition(
    state: &AppState,
    id: DbId,
    action: WorkflowAction,
    actor_id: DbId,
    body: Bytes,
) -> AppResult<Json<ActionResponse<Asset>>> {
    let input: TransitionRequest = optional_json(&body)?;
    let asset = AssetRepo::apply_transition(
        &state.pool,
        id,
        action,
        actor_id,
        input.comment.as_deref(),
    )
    .await?;
    let message = format!("Asset {} successfully", past_tense(action));
    Ok(Json(ActionResponse::with_data(message, asset)))
}

fn past_tense(action: WorkflowAction) -> &'static str {
    match action {
        WorkflowAction::Approve => "approved",
        WorkflowAction::Reject => "rejected",
        WorkflowAction::Review => "reviewed",
        WorkflowAction::Restore => "restored",
    }
}

/// Parse a JSON body that may be absent entirely.
fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}

async fn find_asset(state: &AppState, id: DbId) -> AppResult<Asset> {
    Ok(AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Asset", id))?)
}

async fn check_location(
    state: &AppState,
    location_id: Option<DbId>,
    errors: &mut assetdesk_core::error::FieldErrors,
) -> AppResult<()> {
    if let Some(location_id) = location_id {
        if LocationRepo::find_by_id(&state.pool, location_id).await?.is_none() {
            push_error(errors, "location_id", "The selected location is invalid.");
        }
    }
    Ok(())
}

/// One page of assets with their items attached (two queries).
async fn list_with_items(
    state: &AppState,
    filter: &AssetFilter,
    page: PageRequest,
) -> AppResult<Paginated<AssetWithItems>> {
    let (assets, total) = AssetRepo::list(&state.pool, filter, page).await?;
    let ids: Vec<DbId> = assets.iter().map(|a| a.id).collect();

    let mut items: HashMap<DbId, Vec<AssetItemWithCategory>> = HashMap::new();
    if !ids.is_empty() {
        for item in AssetItemRepo::list_for_assets(&state.pool, &ids).await? {
            items.entry(item.asset_id).or_default().push(item);
        }
    }

    let rows = assets
        .into_iter()
        .map(|asset| AssetWithItems {
            items: items.remove(&asset.id).unwrap_or_default(),
            asset,
        })
        .collect();
    Ok(Paginated::new(rows, total, page))
}
