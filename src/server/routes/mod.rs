//! API routes for the ingestion gateway

pub mod ask;
pub mod files;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Upload - with larger body limit for multipart batches
        .route(
            "/upload",
            post(upload::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Question answering over stored documents
        .route("/ask", post(ask::ask))
        // Upload management
        .route("/files", get(files::list_files))
        .route("/files/:id", delete(files::delete_file))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "docq",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document Q&A ingestion gateway",
        "endpoints": {
            "POST /api/upload": "Upload documents (multipart; knowledge base or session scope)",
            "POST /api/ask": "Ask a question over stored documents",
            "GET /api/files": "List uploaded files for a user",
            "DELETE /api/files/:id": "Delete an uploaded file"
        }
    }))
}
