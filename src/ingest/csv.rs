//! CSV text extraction
//!
//! The first parsed row is treated as a header row and rendered with a
//! `Headers:` prefix; every later row is rendered the same way without
//! the prefix. Field whitespace is trimmed and empty rows are skipped,
//! with row order preserved exactly. Rows whose field counts disagree
//! with the header, and fields that do not decode as UTF-8, fail the
//! document as malformed.

use csv::{ReaderBuilder, Trim};

use crate::error::{Error, Result};

use super::{extractor::Extractor, UploadCandidate};

/// Delimiter between rendered fields
const FIELD_SEPARATOR: &str = " | ";

pub struct CsvExtractor;

impl CsvExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for CsvExtractor {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn matches_mime(&self, mime: &str) -> bool {
        mime == "text/csv"
    }

    fn matches_extension(&self, ext: &str) -> bool {
        ext == "csv"
    }

    fn extract(&self, candidate: &UploadCandidate) -> Result<String> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .trim(Trim::All)
            .from_reader(candidate.data.as_ref());

        let mut lines: Vec<String> = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| Error::malformed(&candidate.name, e.to_string()))?;
            let fields: Vec<&str> = record.iter().collect();
            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }
            let joined = fields.join(FIELD_SEPARATOR);
            if lines.is_empty() {
                lines.push(format!("Headers: {}", joined));
            } else {
                lines.push(joined);
            }
        }

        tracing::debug!(file = %candidate.name, rows = lines.len(), "csv decoded");

        Ok(lines.join("\n"))
    }
}
