//! PowerPoint presentation text extraction
//!
//! Modern presentations are zip archives of XML parts; text lives in
//! `<a:t>` runs inside `ppt/slides/slideN.xml`. Slides are read in
//! numeric order and each contributes a marked block. Legacy `.ppt`
//! binaries are not zip archives and fail as malformed.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

use crate::error::{Error, Result};

use super::{extractor::Extractor, UploadCandidate};

pub struct SlideExtractor;

impl SlideExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SlideExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for SlideExtractor {
    fn name(&self) -> &'static str {
        "slides"
    }

    fn matches_mime(&self, mime: &str) -> bool {
        matches!(
            mime,
            "application/vnd.ms-powerpoint"
                | "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        )
    }

    fn matches_extension(&self, ext: &str) -> bool {
        matches!(ext, "pptx" | "ppt")
    }

    fn extract(&self, candidate: &UploadCandidate) -> Result<String> {
        let cursor = Cursor::new(candidate.data.to_vec());
        let mut archive = zip::ZipArchive::new(cursor)
            .map_err(|e| Error::malformed(&candidate.name, e.to_string()))?;

        let mut slide_names: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .map(|s| s.to_string())
            .collect();
        slide_names.sort_by_key(|name| slide_number(name));

        let mut content = String::new();
        for (index, slide_name) in slide_names.iter().enumerate() {
            let mut xml = String::new();
            match archive.by_name(slide_name) {
                Ok(mut file) => {
                    if let Err(e) = file.read_to_string(&mut xml) {
                        tracing::warn!(
                            file = %candidate.name,
                            slide = %slide_name,
                            error = %e,
                            "skipping unreadable slide"
                        );
                        continue;
                    }
                }
                Err(e) => {
                    tracing::warn!(file = %candidate.name, slide = %slide_name, error = %e, "skipping slide");
                    continue;
                }
            }

            let slide_text = slide_text_from_xml(&xml);
            if !slide_text.is_empty() {
                content.push_str(&format!("[Slide {}]\n{}\n", index + 1, slide_text));
            }
        }

        if content.trim().is_empty() {
            return Err(Error::NoExtractableText {
                filename: candidate.name.clone(),
            });
        }

        tracing::debug!(
            file = %candidate.name,
            slides = slide_names.len(),
            chars = content.len(),
            "presentation decoded"
        );

        Ok(content.trim_end().to_string())
    }
}

/// Numeric component of a slide part name, for ordering (slide2 before slide10)
fn slide_number(name: &str) -> u32 {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(0)
}

/// Collect `<a:t>` text runs from slide XML, one line per paragraph
fn slide_text_from_xml(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current_paragraph = String::new();
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_element = true;
                }
            }
            Ok(Event::Text(e)) => {
                if in_text_element {
                    if let Ok(text) = e.unescape() {
                        if !current_paragraph.is_empty() {
                            current_paragraph.push(' ');
                        }
                        current_paragraph.push_str(text.trim());
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"t" {
                    in_text_element = false;
                } else if name.as_ref() == b"p" && !current_paragraph.trim().is_empty() {
                    paragraphs.push(current_paragraph.trim().to_string());
                    current_paragraph.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    if !current_paragraph.trim().is_empty() {
        paragraphs.push(current_paragraph.trim().to_string());
    }

    paragraphs.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_pptx(slides: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = SimpleFileOptions::default();
            for (name, body) in slides {
                writer.start_file(name.to_string(), options).unwrap();
                writer.write_all(body.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    fn slide_xml(text: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
            text
        )
    }

    fn extract(data: Vec<u8>) -> Result<String> {
        SlideExtractor::new().extract(&UploadCandidate::new(
            "deck.pptx",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            data,
        ))
    }

    #[test]
    fn slides_are_ordered_numerically() {
        let data = build_pptx(&[
            ("ppt/slides/slide10.xml", &slide_xml("tenth")),
            ("ppt/slides/slide2.xml", &slide_xml("second")),
            ("ppt/slides/slide1.xml", &slide_xml("first")),
        ]);
        let text = extract(data).unwrap();

        let first = text.find("first").unwrap();
        let second = text.find("second").unwrap();
        let tenth = text.find("tenth").unwrap();
        assert!(first < second && second < tenth);
        assert!(text.starts_with("[Slide 1]"));
        assert!(text.contains("[Slide 3]\ntenth"));
    }

    #[test]
    fn deck_without_text_fails_as_no_extractable_text() {
        let data = build_pptx(&[("ppt/slides/slide1.xml", "<p:sld></p:sld>")]);
        let err = extract(data).unwrap_err();
        assert!(matches!(err, Error::NoExtractableText { .. }));
    }

    #[test]
    fn garbage_bytes_fail_as_malformed() {
        let err = extract(b"not a zip archive".to_vec()).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn paragraph_runs_are_joined() {
        let xml = r#"<p:sld xmlns:a="u"><a:p><a:r><a:t>Hello</a:t></a:r><a:r><a:t>world</a:t></a:r></a:p></p:sld>"#;
        assert_eq!(slide_text_from_xml(xml), "Hello world");
    }
}
