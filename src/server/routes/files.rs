//! Upload listing and deletion endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;

use super::upload::UploadedFile;

/// Query parameters for listing files
#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    /// Owning user
    pub user_id: String,
    /// Restrict to one session's uploads
    pub session_id: Option<Uuid>,
}

/// Response for file list
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<UploadedFile>,
    pub total: usize,
}

/// GET /api/files - List a user's uploads
pub async fn list_files(
    State(state): State<AppState>,
    Query(params): Query<ListFilesQuery>,
) -> Result<Json<FileListResponse>> {
    let records = match params.session_id {
        Some(session_id) => state.index().list_session(&params.user_id, &session_id)?,
        None => state.index().list_for_user(&params.user_id)?,
    };

    let files: Vec<UploadedFile> = records.iter().map(UploadedFile::from).collect();
    let total = files.len();

    Ok(Json(FileListResponse { files, total }))
}

/// Response for a deletion
#[derive(Debug, Serialize)]
pub struct DeleteFileResponse {
    pub id: Uuid,
    pub filename: String,
}

/// DELETE /api/files/:id - Remove an upload and its stored objects
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteFileResponse>> {
    let record = state
        .index()
        .delete(&id)?
        .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;

    // index row is already gone; object cleanup is best effort
    if let Err(e) = state.store().delete(&record.object_key).await {
        tracing::warn!(key = %record.object_key, error = %e, "failed to delete stored original");
    }
    if let Err(e) = state.store().delete(&record.plaintext_key).await {
        tracing::warn!(key = %record.plaintext_key, error = %e, "failed to delete stored text");
    }

    Ok(Json(DeleteFileResponse {
        id: record.id,
        filename: record.filename,
    }))
}
