//! Plain text extraction
//!
//! Covers `.txt`, `.md` and `.json`, all treated as text. The byte
//! stream is decoded verbatim: output equals the exact decoded content.

use crate::error::{Error, Result};

use super::{extractor::Extractor, UploadCandidate};

pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn matches_mime(&self, mime: &str) -> bool {
        matches!(mime, "text/plain" | "text/markdown" | "application/json")
    }

    fn matches_extension(&self, ext: &str) -> bool {
        matches!(ext, "txt" | "md" | "json")
    }

    fn extract(&self, candidate: &UploadCandidate) -> Result<String> {
        std::str::from_utf8(&candidate.data)
            .map(str::to_string)
            .map_err(|e| Error::malformed(&candidate.name, format!("not valid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_equals_decoded_input() {
        let body = "# Title\n\nSome *markdown* body.\n";
        let candidate = UploadCandidate::new("note.md", "text/markdown", body.as_bytes().to_vec());
        assert_eq!(PlainTextExtractor::new().extract(&candidate).unwrap(), body);
    }

    #[test]
    fn invalid_utf8_fails_as_malformed() {
        let candidate = UploadCandidate::new("bad.txt", "text/plain", vec![0xff, 0xfe, 0x00]);
        let err = PlainTextExtractor::new().extract(&candidate).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }
}
