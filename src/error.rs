//! Error types for the ingestion gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upload batch rejected before extraction
    #[error("Upload validation failed ({} file(s) rejected)", .0.len())]
    Validation(Vec<String>),

    /// Neither MIME type nor extension matched a registered extractor
    #[error("Unsupported format for '{filename}' (observed type: {observed_type})")]
    UnsupportedFormat {
        filename: String,
        observed_type: String,
    },

    /// The underlying decoder could not parse the byte stream
    #[error("Failed to parse '{filename}': {message}")]
    MalformedDocument { filename: String, message: String },

    /// Every PDF page yielded zero text; OCR would be required
    #[error("'{filename}' contains no extractable text on any page (scanned document?)")]
    ImageOnlyDocument { filename: String },

    /// Extraction completed but produced an empty result
    #[error("No text could be extracted from '{filename}'")]
    NoExtractableText { filename: String },

    /// Upload record not found
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// RAG API error
    #[error("RAG API error: {0}")]
    RagApi(String),

    /// Upload index error
    #[error("Upload index error: {0}")]
    Database(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a malformed-document error
    pub fn malformed(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a RAG API error
    pub fn rag_api(message: impl Into<String>) -> Self {
        Self::RagApi(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Error::Validation(errors) = &self {
            let body = Json(json!({
                "error": {
                    "type": "validation_error",
                    "message": "one or more files failed upload validation",
                    "errors": errors,
                }
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                errors.join("; "),
            ),
            Error::UnsupportedFormat { .. } => {
                (StatusCode::BAD_REQUEST, "unsupported_format", self.to_string())
            }
            Error::MalformedDocument { .. } => {
                (StatusCode::BAD_REQUEST, "parse_error", self.to_string())
            }
            Error::ImageOnlyDocument { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "image_only_document", self.to_string())
            }
            Error::NoExtractableText { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "no_extractable_text", self.to_string())
            }
            Error::RecordNotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Record not found: {}", id),
            ),
            Error::RagApi(msg) => (StatusCode::SERVICE_UNAVAILABLE, "rag_api_error", msg.clone()),
            Error::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg.clone())
            }
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
