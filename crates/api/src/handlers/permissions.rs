use assetdesk_db::models::permission::Permission;
use assetdesk_db::repositories::PermissionRepo;
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::permissions::RequireUserManage;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/settings/permissions
///
/// Empty when the permission tables are not provisioned.
pub async fn list(
    State(state): State<AppState>,
    RequireUserManage(_subject): RequireUserManage,
) -> AppResult<Json<DataResponse<Vec<Permission>>>> {
    let data = if state.permission_store.is_ready() {
        PermissionRepo::list_all(&state.pool).await?
    } else {
        Vec::new()
    };
    Ok(Json(DataResponse { data }))
}
