//! Multi-format document ingestion pipeline
//!
//! The pipeline turns a batch of uploaded files into plain text: the
//! [`validate::FileValidator`] rejects disallowed types and oversized
//! files before any parsing, the [`extractor::ExtractorRegistry`] routes
//! each file to a format-specific extractor, and the
//! [`batch::BatchExtractor`] runs the batch in order while isolating
//! per-file failures.

pub mod batch;
pub mod extractor;
pub mod preview;
pub mod validate;

mod csv;
mod excel;
mod pdf;
mod slides;
mod text;
mod word;

pub use self::csv::CsvExtractor;
pub use excel::ExcelExtractor;
pub use pdf::PdfExtractor;
pub use slides::SlideExtractor;
pub use text::PlainTextExtractor;
pub use word::WordExtractor;

use bytes::Bytes;

/// An in-memory file handle as collected from an upload interaction.
///
/// Ephemeral: lives only for the duration of one upload request. The
/// declared MIME type comes from the client and may be empty, generic,
/// or wrong for legacy office formats; dispatch falls back to the
/// filename extension.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    /// Original filename as uploaded
    pub name: String,
    /// Client-declared MIME type (may be empty or unreliable)
    pub declared_mime: String,
    /// Raw file bytes
    pub data: Bytes,
}

impl UploadCandidate {
    /// Create a new upload candidate
    pub fn new(
        name: impl Into<String>,
        declared_mime: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_mime: declared_mime.into(),
            data: data.into(),
        }
    }

    /// File size in bytes
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Lowercased filename extension, without the leading dot
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
    }

    /// Declared MIME type, lowercased with any parameters stripped
    pub fn mime_type(&self) -> String {
        self.declared_mime
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        let candidate = UploadCandidate::new("Report.PDF", "", Vec::new());
        assert_eq!(candidate.extension(), "pdf");
    }

    #[test]
    fn extension_of_bare_name_is_empty() {
        let candidate = UploadCandidate::new("README", "", Vec::new());
        assert_eq!(candidate.extension(), "");
    }

    #[test]
    fn mime_type_strips_parameters() {
        let candidate = UploadCandidate::new("a.txt", "Text/Plain; charset=utf-8", Vec::new());
        assert_eq!(candidate.mime_type(), "text/plain");
    }
}
