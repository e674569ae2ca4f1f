//! Format dispatch over a registry of extractors
//!
//! Dispatch is MIME-first with an extension fallback: browser-reported
//! MIME types for legacy office formats and CSV are unreliable across
//! platforms, so a file whose declared type is absent, generic, or
//! unrecognized still routes by its filename suffix.

use std::sync::Arc;

use crate::error::{Error, Result};

use super::{
    CsvExtractor, ExcelExtractor, PdfExtractor, PlainTextExtractor, SlideExtractor,
    UploadCandidate, WordExtractor,
};

/// A format-specific text extractor.
///
/// Extractors are pure with respect to external state: they hold no
/// process-global configuration and may be shared across concurrent
/// batches.
pub trait Extractor: Send + Sync {
    /// Short name for logs and diagnostics
    fn name(&self) -> &'static str;

    /// Exact match against a normalized (lowercased, parameter-free)
    /// MIME type
    fn matches_mime(&self, mime: &str) -> bool;

    /// Match against a lowercased filename extension (no dot)
    fn matches_extension(&self, ext: &str) -> bool;

    /// Extract normalized plain text from the candidate's bytes
    fn extract(&self, candidate: &UploadCandidate) -> Result<String>;
}

/// Registry of extractors, queried MIME-first then by extension.
///
/// Registration order defines the extension-fallback precedence.
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Registry covering every format the validator allow-lists
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfExtractor::new()));
        registry.register(Arc::new(WordExtractor::new()));
        registry.register(Arc::new(ExcelExtractor::new()));
        registry.register(Arc::new(SlideExtractor::new()));
        registry.register(Arc::new(CsvExtractor::new()));
        registry.register(Arc::new(PlainTextExtractor::new()));
        registry
    }

    /// Register an extractor at the end of the precedence order
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    /// Select the extractor for a candidate.
    ///
    /// Pass 1 matches the declared MIME type exactly; pass 2 falls back
    /// to the filename extension. No match in either pass fails with
    /// [`Error::UnsupportedFormat`] carrying the observed type.
    pub fn dispatch(&self, candidate: &UploadCandidate) -> Result<Arc<dyn Extractor>> {
        let mime = candidate.mime_type();
        if !mime.is_empty() {
            if let Some(extractor) = self.extractors.iter().find(|e| e.matches_mime(&mime)) {
                return Ok(Arc::clone(extractor));
            }
        }

        let ext = candidate.extension();
        if !ext.is_empty() {
            if let Some(extractor) = self.extractors.iter().find(|e| e.matches_extension(&ext)) {
                return Ok(Arc::clone(extractor));
            }
        }

        let observed_type = if mime.is_empty() {
            if ext.is_empty() {
                "unknown".to_string()
            } else {
                format!(".{}", ext)
            }
        } else {
            mime
        };

        Err(Error::UnsupportedFormat {
            filename: candidate.name.clone(),
            observed_type,
        })
    }

    /// Dispatch and run extraction for one candidate
    pub fn extract(&self, candidate: &UploadCandidate) -> Result<String> {
        let extractor = self.dispatch(candidate)?;
        tracing::debug!(
            file = %candidate.name,
            extractor = extractor.name(),
            bytes = candidate.data.len(),
            "dispatching extraction"
        );
        extractor.extract(candidate)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, mime: &str) -> UploadCandidate {
        UploadCandidate::new(name, mime, Vec::new())
    }

    #[test]
    fn dispatches_by_mime_type() {
        let registry = ExtractorRegistry::with_defaults();
        let extractor = registry
            .dispatch(&candidate("noext", "application/pdf"))
            .unwrap();
        assert_eq!(extractor.name(), "pdf");
    }

    #[test]
    fn falls_back_to_extension_for_generic_mime() {
        let registry = ExtractorRegistry::with_defaults();
        let extractor = registry
            .dispatch(&candidate("table.csv", "application/octet-stream"))
            .unwrap();
        assert_eq!(extractor.name(), "csv");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let registry = ExtractorRegistry::with_defaults();
        let extractor = registry.dispatch(&candidate("NOTES.MD", "")).unwrap();
        assert_eq!(extractor.name(), "text");
    }

    #[test]
    fn json_routes_to_plain_text() {
        let registry = ExtractorRegistry::with_defaults();
        let extractor = registry.dispatch(&candidate("data.json", "")).unwrap();
        assert_eq!(extractor.name(), "text");
    }

    #[test]
    fn unknown_format_carries_diagnostics() {
        let registry = ExtractorRegistry::with_defaults();
        let err = match registry.dispatch(&candidate("image.png", "image/png")) {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        match err {
            Error::UnsupportedFormat {
                filename,
                observed_type,
            } => {
                assert_eq!(filename, "image.png");
                assert_eq!(observed_type, "image/png");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_format_without_mime_reports_extension() {
        let registry = ExtractorRegistry::with_defaults();
        let err = match registry.dispatch(&candidate("archive.tar", "")) {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        match err {
            Error::UnsupportedFormat { observed_type, .. } => {
                assert_eq!(observed_type, ".tar");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
