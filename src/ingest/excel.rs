//! Excel workbook text extraction
//!
//! Sheets are rendered in workbook order as tab-separated, newline
//! delimited dumps, each prefixed by a sheet-boundary marker carrying
//! the 1-based sheet index and name.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

use crate::error::{Error, Result};

use super::{extractor::Extractor, UploadCandidate};

pub struct ExcelExtractor;

impl ExcelExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExcelExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for ExcelExtractor {
    fn name(&self) -> &'static str {
        "excel"
    }

    fn matches_mime(&self, mime: &str) -> bool {
        matches!(
            mime,
            "application/vnd.ms-excel"
                | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        )
    }

    fn matches_extension(&self, ext: &str) -> bool {
        matches!(ext, "xlsx" | "xls")
    }

    fn extract(&self, candidate: &UploadCandidate) -> Result<String> {
        let cursor = Cursor::new(candidate.data.to_vec());
        let mut workbook = open_workbook_auto_from_rs(cursor)
            .map_err(|e| Error::malformed(&candidate.name, e.to_string()))?;

        let mut content = String::new();
        for (index, sheet_name) in workbook.sheet_names().to_vec().iter().enumerate() {
            match workbook.worksheet_range(sheet_name) {
                Ok(range) => {
                    render_sheet(&mut content, index + 1, sheet_name, range.rows());
                }
                Err(e) => {
                    tracing::warn!(
                        file = %candidate.name,
                        sheet = %sheet_name,
                        error = %e,
                        "skipping unreadable sheet"
                    );
                }
            }
        }

        tracing::debug!(file = %candidate.name, chars = content.len(), "workbook decoded");

        Ok(content.trim_end().to_string())
    }
}

/// Append one sheet as a marked, tab-separated block.
///
/// Rows whose cells are all empty are dropped; everything else is kept
/// in sheet order.
fn render_sheet<'a>(
    out: &mut String,
    index: usize,
    name: &str,
    rows: impl Iterator<Item = &'a [Data]>,
) {
    out.push_str(&format!("[Sheet {}: {}]\n", index, name));
    for row in rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out.push('\n');
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        _ => String::new(),
    }
}
