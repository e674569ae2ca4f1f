//! PDF text extraction
//!
//! Pages are decoded in document order and each contributes a marked
//! block, so extracted text stays traceable back to its source page.
//! Pages with no extractable text are marked explicitly rather than
//! skipped: they usually indicate scanned, image-only content.

use lopdf::Document;

use crate::error::{Error, Result};

use super::{extractor::Extractor, UploadCandidate};

/// PDF extractor backed by lopdf.
///
/// Holds no process-global state; construct one per registry.
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn matches_mime(&self, mime: &str) -> bool {
        mime == "application/pdf"
    }

    fn matches_extension(&self, ext: &str) -> bool {
        ext == "pdf"
    }

    fn extract(&self, candidate: &UploadCandidate) -> Result<String> {
        let doc = Document::load_mem(&candidate.data)
            .map_err(|e| Error::malformed(&candidate.name, format!("not a readable PDF: {}", e)))?;

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(Error::NoExtractableText {
                filename: candidate.name.clone(),
            });
        }

        let mut page_texts = Vec::with_capacity(pages.len());
        for &page_number in pages.keys() {
            let raw = match doc.extract_text(&[page_number]) {
                Ok(text) => text,
                Err(e) => {
                    // font or content-stream oddities on a single page
                    // degrade to an empty page, not a document failure
                    tracing::debug!(
                        file = %candidate.name,
                        page = page_number,
                        error = %e,
                        "page text extraction failed"
                    );
                    String::new()
                }
            };
            page_texts.push(normalize_page_text(&raw));
        }

        tracing::debug!(
            file = %candidate.name,
            pages = page_texts.len(),
            empty_pages = page_texts.iter().filter(|p| p.is_empty()).count(),
            "pdf decoded"
        );

        assemble_pages(&candidate.name, &page_texts)
    }
}

/// Join text runs with single spaces, collapsing whitespace runs
fn normalize_page_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenate per-page text into the marked output document.
///
/// Every page contributes a `[Page N]` block (1-based). A page with no
/// text gets an explicit empty-page marker. A document where every page
/// is empty needs OCR, which this extractor does not perform.
fn assemble_pages(filename: &str, pages: &[String]) -> Result<String> {
    if !pages.is_empty() && pages.iter().all(|p| p.is_empty()) {
        return Err(Error::ImageOnlyDocument {
            filename: filename.to_string(),
        });
    }

    let mut out = String::new();
    for (index, text) in pages.iter().enumerate() {
        let number = index + 1;
        if text.is_empty() {
            out.push_str(&format!("[Page {}: no extractable text]\n", number));
        } else {
            out.push_str(&format!("[Page {}]\n{}\n", number, text));
        }
    }

    if out.trim().is_empty() {
        return Err(Error::NoExtractableText {
            filename: filename.to_string(),
        });
    }

    Ok(out.trim_end().to_string())
}
