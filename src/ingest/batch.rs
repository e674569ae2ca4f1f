//! Error-tolerant batch extraction
//!
//! Files are processed one at a time in input order, so at most one
//! decoded buffer is live per batch. A failure is recorded in place of
//! that file's text and the batch carries on: one corrupt or
//! unsupported file never blocks ingestion of the rest.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::error::Error;

use super::{extractor::ExtractorRegistry, UploadCandidate};

/// Per-file result of a batch extraction, tagged success or failure.
///
/// Callers that still expect the flat string contract can render a
/// failure as its sentinel string via [`ExtractionOutcome::into_text`].
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// Extraction produced text
    Extracted { filename: String, text: String },
    /// Extraction failed; the batch recorded the error and moved on
    Failed { filename: String, error: Error },
}

impl ExtractionOutcome {
    /// Filename of the input this outcome belongs to
    pub fn filename(&self) -> &str {
        match self {
            Self::Extracted { filename, .. } | Self::Failed { filename, .. } => filename,
        }
    }

    /// True for a successful extraction
    pub fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }

    /// Extracted text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Extracted { text, .. } => Some(text),
            Self::Failed { .. } => None,
        }
    }

    /// Flatten into the legacy string contract: real text on success,
    /// an embedded error marker on failure.
    pub fn into_text(self) -> String {
        match self {
            Self::Extracted { text, .. } => text,
            Self::Failed { filename, error } => sentinel(&filename, &error),
        }
    }
}

/// Render the sentinel string embedded in batch output for a failed file
pub fn sentinel(filename: &str, error: &Error) -> String {
    format!("[Error parsing {}: {}]", filename, error)
}

/// Sequential batch extractor over a shared registry
pub struct BatchExtractor {
    registry: Arc<ExtractorRegistry>,
    file_timeout: Duration,
}

impl BatchExtractor {
    pub fn new(registry: Arc<ExtractorRegistry>, file_timeout: Duration) -> Self {
        Self {
            registry,
            file_timeout,
        }
    }

    /// Extract every file in order, one outcome per input.
    ///
    /// The output has the same length and order as the input. Extraction
    /// of file N+1 begins only after file N settles; decoding runs on a
    /// blocking thread under a per-file timeout so one pathological
    /// document cannot wedge the batch.
    pub async fn extract_all(&self, files: &[UploadCandidate]) -> Vec<ExtractionOutcome> {
        let mut outcomes = Vec::with_capacity(files.len());

        for candidate in files {
            let filename = candidate.name.clone();
            let started = Instant::now();

            let registry = Arc::clone(&self.registry);
            let task_candidate = candidate.clone();
            let result = timeout(
                self.file_timeout,
                tokio::task::spawn_blocking(move || registry.extract(&task_candidate)),
            )
            .await;

            let outcome = match result {
                Ok(Ok(Ok(text))) => {
                    tracing::info!(
                        file = %filename,
                        chars = text.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "extracted"
                    );
                    ExtractionOutcome::Extracted { filename, text }
                }
                Ok(Ok(Err(error))) => {
                    tracing::warn!(file = %filename, error = %error, "extraction failed");
                    ExtractionOutcome::Failed { filename, error }
                }
                Ok(Err(join_error)) => {
                    tracing::error!(file = %filename, error = %join_error, "extraction task died");
                    ExtractionOutcome::Failed {
                        filename,
                        error: Error::internal(format!("extraction task failed: {}", join_error)),
                    }
                }
                Err(_) => {
                    tracing::error!(
                        file = %filename,
                        timeout_secs = self.file_timeout.as_secs(),
                        "extraction timed out"
                    );
                    ExtractionOutcome::Failed {
                        filename,
                        error: Error::internal(format!(
                            "extraction timed out after {}s",
                            self.file_timeout.as_secs()
                        )),
                    }
                }
            };

            outcomes.push(outcome);
        }

        outcomes
    }

    /// Legacy contract: one string per input, with failures rendered as
    /// embedded sentinel markers.
    pub async fn extract_all_text(&self, files: &[UploadCandidate]) -> Vec<String> {
        self.extract_all(files)
            .await
            .into_iter()
            .map(ExtractionOutcome::into_text)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> BatchExtractor {
        BatchExtractor::new(
            Arc::new(ExtractorRegistry::with_defaults()),
            Duration::from_secs(30),
        )
    }

    fn text_file(name: &str, body: &str) -> UploadCandidate {
        UploadCandidate::new(name, "text/plain", body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn failures_are_isolated_and_order_preserved() {
        let files = vec![
            text_file("a.txt", "alpha"),
            UploadCandidate::new("b.pdf", "application/pdf", b"corrupt".to_vec()),
            text_file("c.txt", "gamma"),
        ];

        let outcomes = batch().extract_all(&files).await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].text(), Some("alpha"));
        assert!(!outcomes[1].is_extracted());
        assert_eq!(outcomes[1].filename(), "b.pdf");
        assert_eq!(outcomes[2].text(), Some("gamma"));
    }

    #[tokio::test]
    async fn sentinel_shim_embeds_name_and_message() {
        let files = vec![
            text_file("a.txt", "alpha"),
            UploadCandidate::new("b.pdf", "application/pdf", b"corrupt".to_vec()),
        ];

        let texts = batch().extract_all_text(&files).await;
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0], "alpha");
        assert!(texts[1].starts_with("[Error parsing b.pdf:"));
        assert!(texts[1].ends_with(']'));
    }

    #[tokio::test]
    async fn unsupported_format_is_a_per_file_failure() {
        let files = vec![UploadCandidate::new("img.png", "image/png", vec![1, 2, 3])];
        let outcomes = batch().extract_all(&files).await;
        assert!(matches!(
            outcomes[0],
            ExtractionOutcome::Failed {
                error: Error::UnsupportedFormat { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_output() {
        let outcomes = batch().extract_all(&[]).await;
        assert!(outcomes.is_empty());
    }
}
