//! Content extraction: uploaded bytes to statement text
//!
//! The container format is chosen by file extension alone:
//! - `.csv` / `.txt` / `.ofx` are decoded as text (UTF-8, else Latin-1)
//! - `.xlsx` / `.xls` have their first sheet flattened to `;`-joined lines
//! - `.pdf` goes through a [`DocumentTextExtractor`]

use std::io::{Cursor, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use csv::WriterBuilder;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{RawStatementText, SourceFormat};

/// Reported when a filename has no extension at all
pub const NO_EXTENSION: &str = "(sem extensão)";

/// Reported when the document extractor crashes on malformed input
pub const UNREADABLE_DOCUMENT: &str = "documento corrompido ou ilegível";

/// Turns a binary document (PDF) into plain text
pub trait DocumentTextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// PDF text extraction backed by `pdf-extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl DocumentTextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| Error::Extraction(e.to_string()))
    }
}

/// Lowercase extension with its leading dot, or empty when there is none
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// Resolve the container format of `filename`
pub fn source_format(filename: &str) -> Result<SourceFormat> {
    let ext = file_extension(filename);
    debug!("Detected extension: {:?}", ext);

    if ext.is_empty() {
        return Err(Error::UnsupportedFormat(NO_EXTENSION.to_string()));
    }
    SourceFormat::from_extension(&ext).ok_or(Error::UnsupportedFormat(ext))
}

/// Read an uploaded statement and produce its text view
pub fn extract_content<R: Read>(
    mut reader: R,
    filename: &str,
    documents: &dyn DocumentTextExtractor,
) -> Result<RawStatementText> {
    let format = source_format(filename)?;

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let text = match format {
        SourceFormat::Delimited | SourceFormat::Ofx => decode_text(bytes),
        SourceFormat::Spreadsheet => flatten_workbook(bytes)?,
        SourceFormat::Pdf => normalize_whitespace(&document_text(documents, &bytes)?),
    };

    debug!("Extracted {} chars of {} text", text.len(), format);
    Ok(RawStatementText::new(format, text))
}

/// Run the document extractor with its panics contained.
///
/// `pdf-extract` unwraps on some malformed PDFs; such a crash is reported as
/// an extraction failure for this document only.
fn document_text(documents: &dyn DocumentTextExtractor, bytes: &[u8]) -> Result<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| documents.extract_text(bytes))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            warn!("Document extractor panicked: {}", reason);
            Err(Error::Extraction(UNREADABLE_DOCUMENT.to_string()))
        }
    }
}

/// UTF-8 without BOM, falling back to Latin-1 for legacy exports
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        },
        Err(err) => {
            debug!("Content is not UTF-8, decoding as Latin-1");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

/// Unify line breaks, collapse whitespace runs and drop blank lines
fn normalize_whitespace(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn flatten_workbook(bytes: Vec<u8>) -> Result<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| Error::Extraction(format!("Planilha inválida: {}", e)))?;

    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(String::new());
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| Error::Extraction(format!("Planilha inválida: {}", e)))?;

    debug!("Flattening sheet {:?} ({} rows)", sheet, range.height());
    flatten_rows(range.rows())
}

/// Join each row's cells with `;`, quoting cells that contain one
pub(crate) fn flatten_rows<'a>(rows: impl Iterator<Item = &'a [Data]>) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(row.iter().map(render_cell))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Extraction(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Extraction(e.to_string()))
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(date) => date.format("%d/%m/%Y").to_string(),
            None => cell.to_string(),
        },
        other => other.to_string(),
    }
}
