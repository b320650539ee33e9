//! Asset document upload, listing, download and removal.
//!
//! Metadata lives in `asset_documents`; bytes live in [`crate::storage`].

use assetdesk_core::types::DbId;
use assetdesk_db::models::document::{AssetDocument, CreateAssetDocument};
use assetdesk_db::repositories::{AssetRepo, DocumentRepo};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::handlers::not_found;
use crate::middleware::permissions::{RequireAssetEdit, RequireAssetView};
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;
use crate::storage::{sha256_hex, storage_key};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// POST /api/v1/assets-management/{id}/documents
///
/// Multipart form with a required `file` field.
pub async fn upload(
    State(state): State<AppState>,
    RequireAssetEdit(subject): RequireAssetEdit,
    Path(asset_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ActionResponse<AssetDocument>>)> {
    if AssetRepo::find_by_id(&state.pool, asset_id).await?.is_none() {
        return Err(not_found("Asset", asset_id).into());
    }

    let mut upload: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = clean_file_name(field.file_name().unwrap_or("document"));
        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((file_name, mime_type, data.to_vec()));
    }

    let (file_name, mime_type, data) =
        upload.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    let key = storage_key(asset_id, &file_name);
    state.storage.put(&key, &data).await?;

    let create = CreateAssetDocument {
        asset_id,
        file_name,
        storage_key: key.clone(),
        mime_type,
        size_bytes: data.len() as i64,
        checksum_sha256: sha256_hex(&data),
        uploaded_by: Some(subject.user_id),
    };
    let document = match DocumentRepo::create(&state.pool, &create).await {
        Ok(document) => document,
        Err(e) => {
            // The row never landed; drop the orphaned file.
            if let Err(cleanup) = state.storage.delete(&key).await {
                tracing::warn!(storage_key = %key, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        asset_id,
        document_id = document.id,
        size_bytes = document.size_bytes,
        uploaded_by = subject.user_id,
        "Document uploaded",
    );
    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::with_data("Document uploaded successfully", document)),
    ))
}

/// GET /api/v1/assets-management/{id}/documents
pub async fn list(
    State(state): State<AppState>,
    RequireAssetView(_subject): RequireAssetView,
    Path(asset_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AssetDocument>>>> {
    if AssetRepo::find_by_id(&state.pool, asset_id).await?.is_none() {
        return Err(not_found("Asset", asset_id).into());
    }
    let data = DocumentRepo::list_for_asset(&state.pool, asset_id).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/assets-management/documents/{id}/download
pub async fn download(
    State(state): State<AppState>,
    RequireAssetView(_subject): RequireAssetView,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("AssetDocument", id))?;
    let bytes = state.storage.get(&document.storage_key).await?;

    let content_type = HeaderValue::from_str(&document.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        document.file_name
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// DELETE /api/v1/assets-management/documents/{id}
///
/// The row goes first; a file left behind by a failed storage delete is
/// only logged.
pub async fn delete(
    State(state): State<AppState>,
    RequireAssetEdit(_subject): RequireAssetEdit,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse>> {
    let document = DocumentRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("AssetDocument", id))?;
    if let Err(e) = state.storage.delete(&document.storage_key).await {
        tracing::warn!(document_id = id, error = %e, "Failed to remove document file");
    }
    Ok(Json(ActionResponse::ok("Document deleted successfully")))
}

/// Keep the last path segment and drop characters that cannot appear in a
/// quoted header value.
fn clean_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_keeps_last_segment() {
        assert_eq!(clean_file_name("C:\\Users\\me\\invoice.pdf"), "invoice.pdf");
        assert_eq!(clean_file_name("../../etc/passwd"), "passwd");
    }

    #[test]
    fn file_name_drops_quotes_and_controls() {
        assert_eq!(clean_file_name("re\"port\n.txt"), "report.txt");
        assert_eq!(clean_file_name("\"\""), "document");
        assert_eq!(clean_file_name(""), "document");
    }
}
