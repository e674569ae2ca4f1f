//! Document upload endpoint
//!
//! Validation rejects the whole batch before any parsing; extraction
//! failures afterwards are recorded per file and never abort the rest
//! of the batch.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingest::{batch::ExtractionOutcome, preview::content_preview, UploadCandidate};
use crate::server::state::AppState;
use crate::storage::{object_key, StorageScope, UploadRecord};

/// Query parameters for an upload
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Owning user
    pub user_id: String,
    /// Optional session scope; omitted means the knowledge base
    pub session_id: Option<Uuid>,
}

/// Summary of one stored upload
#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub preview: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&UploadRecord> for UploadedFile {
    fn from(record: &UploadRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename.clone(),
            mime_type: record.mime_type.clone(),
            size_bytes: record.size_bytes,
            preview: record.preview.clone(),
            uploaded_at: record.uploaded_at,
        }
    }
}

/// A file that was accepted but not stored again
#[derive(Debug, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// A file whose extraction or storage failed
#[derive(Debug, Serialize)]
pub struct UploadError {
    pub filename: String,
    pub error: String,
}

/// Response for an upload batch
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// True when at least one file was stored
    pub success: bool,
    pub files: Vec<UploadedFile>,
    pub skipped: Vec<SkippedFile>,
    pub errors: Vec<UploadError>,
    pub processing_time_ms: u64,
}

/// POST /api/upload - Validate, extract and store a batch of files
pub async fn upload_files(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();

    let mut candidates = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::internal(format!("Failed to read multipart field: {}", e)))?
    {
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("file_{}.bin", Uuid::new_v4()));
        let declared_mime = field.content_type().unwrap_or("").to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::internal(format!("Failed to read '{}': {}", filename, e)))?;

        candidates.push(UploadCandidate::new(filename, declared_mime, data));
    }

    // hard pre-check: the whole batch is rejected before any parsing
    let validation = state.validator().validate(&candidates);
    if !validation.valid {
        return Err(Error::Validation(validation.errors));
    }

    let scope = match params.session_id {
        Some(session_id) => StorageScope::Session(session_id),
        None => StorageScope::KnowledgeBase,
    };

    let outcomes = state.batch().extract_all(&candidates).await;

    let mut files = Vec::new();
    let mut skipped = Vec::new();
    let mut errors = Vec::new();

    for (candidate, outcome) in candidates.iter().zip(outcomes) {
        match outcome {
            ExtractionOutcome::Extracted { filename, text } => {
                match store_file(&state, &params, &scope, candidate, &text).await {
                    Ok(StoreResult::Stored(record)) => {
                        files.push(UploadedFile::from(&record));
                    }
                    Ok(StoreResult::Duplicate(existing)) => {
                        skipped.push(SkippedFile {
                            filename,
                            reason: format!("duplicate of '{}'", existing.filename),
                        });
                    }
                    Err(e) => {
                        tracing::error!(file = %filename, error = %e, "failed to store upload");
                        errors.push(UploadError {
                            filename,
                            error: e.to_string(),
                        });
                    }
                }
            }
            ExtractionOutcome::Failed { filename, error } => {
                errors.push(UploadError {
                    filename,
                    error: error.to_string(),
                });
            }
        }
    }

    Ok(Json(UploadResponse {
        success: !files.is_empty(),
        files,
        skipped,
        errors,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

enum StoreResult {
    Stored(UploadRecord),
    Duplicate(UploadRecord),
}

/// Store one extracted file: original bytes, plain text, and index row
async fn store_file(
    state: &AppState,
    params: &UploadParams,
    scope: &StorageScope,
    candidate: &UploadCandidate,
    text: &str,
) -> Result<StoreResult> {
    let content_hash = hash_bytes(&candidate.data);

    if let Some(existing) = state.index().find_by_hash(&params.user_id, &content_hash)? {
        tracing::info!(
            file = %candidate.name,
            existing = %existing.filename,
            "skipping duplicate upload"
        );
        return Ok(StoreResult::Duplicate(existing));
    }

    let uploaded_at = Utc::now();
    let key = object_key(&params.user_id, scope, uploaded_at, &candidate.name);
    let plaintext_key = format!("{}.txt", key);

    let mime_type = if candidate.mime_type().is_empty() {
        mime_guess::from_path(&candidate.name)
            .first_or_octet_stream()
            .to_string()
    } else {
        candidate.mime_type()
    };

    state.store().put(&key, &candidate.data, &mime_type).await?;
    state
        .store()
        .put(&plaintext_key, text.as_bytes(), "text/plain")
        .await?;

    let record = UploadRecord {
        id: Uuid::new_v4(),
        user_id: params.user_id.clone(),
        session_id: params.session_id,
        filename: candidate.name.clone(),
        mime_type,
        size_bytes: candidate.size_bytes(),
        content_hash,
        object_key: key,
        plaintext_key,
        preview: content_preview(text, state.config().ingest.preview_max_chars),
        uploaded_at,
    };
    state.index().insert(&record)?;

    tracing::info!(
        file = %record.filename,
        user = %record.user_id,
        key = %record.object_key,
        chars = text.len(),
        "upload stored"
    );

    Ok(StoreResult::Stored(record))
}

fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
