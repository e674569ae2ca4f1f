//! RAG API client with retry logic
//!
//! The RAG backend is an opaque remote service: it receives the
//! question together with the extracted document contents and returns
//! an answer. Requests are retried with exponential backoff.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::RagApiConfig;
use crate::error::{Error, Result};

/// Request body for the RAG ask endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AskRequest {
    /// Owning user
    pub user_id: String,
    /// Chat session the question belongs to
    pub session_id: String,
    /// The user's question
    pub question: String,
    /// Extracted document contents, one entry per file
    pub file_contents: Vec<String>,
    /// Whether the documents should be indexed into the user's
    /// persistent knowledge base
    pub index_user: bool,
}

/// Response body from the RAG ask endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AskResponse {
    /// Generated answer
    pub answer: String,
}

/// RAG API client with automatic retry
pub struct RagClient {
    client: Client,
    config: RagApiConfig,
    max_retries: u32,
}

impl RagClient {
    /// Create a new RAG client
    pub fn new(config: &RagApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            config: config.clone(),
        })
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "RAG request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::rag_api("Unknown error")))
    }

    /// Check if the RAG service is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Ask a question over the given document contents
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse> {
        let url = format!("{}/api/ask", self.config.base_url);

        self.retry_request(|| {
            let url = url.clone();
            let client = self.client.clone();

            async move {
                let response = client
                    .post(&url)
                    .json(request)
                    .send()
                    .await
                    .map_err(|e| Error::rag_api(format!("Ask request failed: {}", e)))?;

                if !response.status().is_success() {
                    return Err(Error::rag_api(format!(
                        "Ask failed: HTTP {}",
                        response.status()
                    )));
                }

                response
                    .json::<AskResponse>()
                    .await
                    .map_err(|e| Error::rag_api(format!("Invalid ask response: {}", e)))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_request_uses_the_agreed_field_names() {
        let request = AskRequest {
            user_id: "u1".to_string(),
            session_id: "s1".to_string(),
            question: "what is this?".to_string(),
            file_contents: vec!["doc text".to_string()],
            index_user: true,
        };

        let value = serde_json::to_value(&request).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["file_contents", "index_user", "question", "session_id", "user_id"]
        );
        assert_eq!(value["file_contents"][0], "doc text");
        assert_eq!(value["index_user"], true);
    }
}
