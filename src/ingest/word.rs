//! Word document text extraction
//!
//! Decodes modern zipped-XML Word binaries into raw text, discarding
//! styling. Structures without a text rendering (tables, drawings) are
//! logged and skipped, not surfaced as failures.

use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

use crate::error::{Error, Result};

use super::{extractor::Extractor, UploadCandidate};

pub struct WordExtractor;

impl WordExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for WordExtractor {
    fn name(&self) -> &'static str {
        "word"
    }

    fn matches_mime(&self, mime: &str) -> bool {
        matches!(
            mime,
            "application/msword"
                | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        )
    }

    fn matches_extension(&self, ext: &str) -> bool {
        matches!(ext, "docx" | "doc")
    }

    fn extract(&self, candidate: &UploadCandidate) -> Result<String> {
        let doc = read_docx(&candidate.data)
            .map_err(|e| Error::malformed(&candidate.name, e.to_string()))?;

        let mut content = String::new();
        for child in doc.document.children {
            match child {
                DocumentChild::Paragraph(paragraph) => {
                    for child in paragraph.children {
                        if let ParagraphChild::Run(run) = child {
                            for child in run.children {
                                if let RunChild::Text(text) = child {
                                    content.push_str(&text.text);
                                }
                            }
                        }
                    }
                    content.push('\n');
                }
                DocumentChild::Table(_) => {
                    tracing::debug!(file = %candidate.name, "skipping table content");
                }
                _ => {}
            }
        }

        tracing::debug!(file = %candidate.name, chars = content.len(), "word document decoded");

        Ok(content.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
        }
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).expect("pack docx");
        cursor.into_inner()
    }

    #[test]
    fn extracts_paragraph_text() {
        let data = build_docx(&["Hello world", "Second paragraph"]);
        let candidate = UploadCandidate::new(
            "note.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            data,
        );
        let text = WordExtractor::new().extract(&candidate).unwrap();
        assert_eq!(text, "Hello world\nSecond paragraph");
    }

    #[test]
    fn garbage_bytes_fail_as_malformed() {
        let candidate = UploadCandidate::new("broken.docx", "", b"not a docx".to_vec());
        let err = WordExtractor::new().extract(&candidate).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }
}
