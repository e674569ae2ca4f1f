//! Pre-extraction upload validation
//!
//! Checks the whole batch against the type allow-list and the size
//! ceiling before any parsing is attempted. Validation never partially
//! passes a call: the caller decides whether to drop the failing subset
//! and re-validate, or abort the upload.

use serde::Serialize;

use super::UploadCandidate;

/// MIME types accepted for upload
const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "text/plain",
    "text/markdown",
    "text/csv",
    "application/json",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Filename extensions accepted for upload (without the dot)
const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "txt", "md", "json", "csv", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
];

/// Aggregated result of validating one upload batch
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// True iff every file in the batch passed both checks
    pub valid: bool,
    /// One human-readable message per failing file, in input order
    pub errors: Vec<String>,
}

/// Upload batch validator
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: u64,
}

impl FileValidator {
    /// Create a validator with the given per-file size ceiling in bytes
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Validate a batch of upload candidates.
    ///
    /// Pure: does not mutate its input. Emits at most one error per
    /// failing file; the type check takes precedence over the size
    /// check.
    pub fn validate(&self, files: &[UploadCandidate]) -> ValidationResult {
        let mut errors = Vec::new();

        for file in files {
            if !self.is_allowed_type(file) {
                let observed = observed_type(file);
                errors.push(format!("{}: unsupported file type ({})", file.name, observed));
            } else if file.size_bytes() > self.max_file_size {
                errors.push(format!(
                    "{}: exceeds the {} MiB size limit",
                    file.name,
                    self.max_file_size / (1024 * 1024)
                ));
            }
        }

        ValidationResult {
            valid: errors.is_empty(),
            errors,
        }
    }

    fn is_allowed_type(&self, file: &UploadCandidate) -> bool {
        let mime = file.mime_type();
        if !mime.is_empty() && ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
            return true;
        }
        let ext = file.extension();
        ALLOWED_EXTENSIONS.contains(&ext.as_str())
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(crate::config::IngestConfig::default().max_file_size)
    }
}

/// Best description of a file's type for diagnostics
fn observed_type(file: &UploadCandidate) -> String {
    let mime = file.mime_type();
    if !mime.is_empty() {
        return mime;
    }
    let ext = file.extension();
    if ext.is_empty() {
        "unknown".to_string()
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, mime: &str, size: usize) -> UploadCandidate {
        UploadCandidate::new(name, mime, vec![0u8; size])
    }

    #[test]
    fn accepts_all_allowed_formats() {
        let validator = FileValidator::default();
        let files = vec![
            candidate("a.pdf", "application/pdf", 10),
            candidate("b.docx", "", 10),
            candidate("c.xls", "application/vnd.ms-excel", 10),
            candidate("d.csv", "text/csv", 10),
            candidate("e.md", "", 10),
            candidate("f.pptx", "", 10),
        ];
        let result = validator.validate(&files);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn rejects_disallowed_type_with_one_message() {
        let validator = FileValidator::default();
        let files = vec![
            candidate("a.txt", "text/plain", 10),
            candidate("malware.exe", "application/x-msdownload", 10),
            candidate("b.txt", "text/plain", 10),
        ];
        let result = validator.validate(&files);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("malware.exe:"));
    }

    #[test]
    fn rejects_oversize_file() {
        let validator = FileValidator::new(100);
        let files = vec![candidate("big.txt", "text/plain", 101)];
        let result = validator.validate(&files);
        assert!(!result.valid);
        assert!(result.errors[0].contains("size limit"));
    }

    #[test]
    fn size_at_the_ceiling_passes() {
        let validator = FileValidator::new(100);
        let files = vec![candidate("exact.txt", "text/plain", 100)];
        assert!(validator.validate(&files).valid);
    }

    #[test]
    fn extension_rescues_generic_mime() {
        // browsers report octet-stream for legacy office formats
        let validator = FileValidator::default();
        let files = vec![candidate("old.doc", "application/octet-stream", 10)];
        assert!(validator.validate(&files).valid);
    }

    #[test]
    fn one_error_per_failing_file() {
        let validator = FileValidator::new(100);
        let files = vec![
            candidate("a.exe", "", 10),
            candidate("b.txt", "text/plain", 500),
            candidate("c.txt", "text/plain", 10),
        ];
        let result = validator.validate(&files);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn empty_batch_is_valid() {
        let validator = FileValidator::default();
        assert!(validator.validate(&[]).valid);
    }
}
