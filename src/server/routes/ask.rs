//! Question answering over stored documents

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::rag::AskRequest;
use crate::server::state::AppState;

/// Request body for asking a question
#[derive(Debug, Deserialize)]
pub struct AskParams {
    /// Owning user
    pub user_id: String,
    /// Session whose documents to use; omitted means the knowledge base
    pub session_id: Option<Uuid>,
    /// The question to answer
    pub question: String,
}

/// Response body with the generated answer
#[derive(Debug, Serialize)]
pub struct AskResult {
    pub answer: String,
    /// How many stored documents were sent as context
    pub files_used: usize,
}

/// POST /api/ask - Forward a question plus stored document contents to
/// the RAG service
pub async fn ask(
    State(state): State<AppState>,
    Json(params): Json<AskParams>,
) -> Result<Json<AskResult>> {
    let records = match params.session_id {
        Some(session_id) => state.index().list_session(&params.user_id, &session_id)?,
        None => state.index().list_knowledge_base(&params.user_id)?,
    };

    let mut file_contents = Vec::with_capacity(records.len());
    for record in &records {
        match state.store().get(&record.plaintext_key).await {
            Ok(bytes) => file_contents.push(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                tracing::warn!(
                    file = %record.filename,
                    key = %record.plaintext_key,
                    error = %e,
                    "stored text unavailable, leaving it out of the context"
                );
            }
        }
    }

    let files_used = file_contents.len();
    tracing::info!(
        user = %params.user_id,
        session = ?params.session_id,
        files = files_used,
        "forwarding question to RAG service"
    );

    let request = AskRequest {
        user_id: params.user_id,
        session_id: params
            .session_id
            .map(|s| s.to_string())
            .unwrap_or_default(),
        question: params.question,
        file_contents,
        index_user: params.session_id.is_none(),
    };

    let response = state.rag().ask(&request).await?;

    Ok(Json(AskResult {
        answer: response.answer,
        files_used,
    }))
}
