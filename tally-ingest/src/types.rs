use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::IngestError;

/// Input container kinds accepted by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Csv,
    Spreadsheet,
    Pdf,
}

impl DocumentKind {
    /// Pick the kind from a filename's extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, IngestError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(DocumentKind::Csv),
            "xls" | "xlsx" | "xlsm" | "ods" => Ok(DocumentKind::Spreadsheet),
            "pdf" => Ok(DocumentKind::Pdf),
            _ => Err(IngestError::UnsupportedFormat {
                filename: filename.to_string(),
            }),
        }
    }
}

/// An uploaded statement: raw bytes plus the kind sniffed from its name
#[derive(Debug, Clone)]
pub struct RawDocument {
    filename: String,
    kind: DocumentKind,
    bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, IngestError> {
        let filename = filename.into();
        let kind = DocumentKind::from_filename(&filename)?;
        Ok(Self {
            filename,
            kind,
            bytes,
        })
    }

    /// Read a statement from disk, keeping only its file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        // Reject before reading a potentially large unsupported file.
        DocumentKind::from_filename(&filename)?;
        let bytes = fs::read(path)?;
        Self::new(filename, bytes)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Row-oriented table of raw string cells; `header` holds the first row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, col)`, empty when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// One line of recovered PDF text (text layer or OCR), tagged with its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub page: u32,
    pub text: String,
}

impl TextLine {
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// Unvalidated, line-derived guess at a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCandidate {
    pub date_text: String,
    pub description: String,
    pub amount: f64,
}

impl TransactionCandidate {
    /// Header used when candidates are fed to the column normalizer.
    pub const HEADER: [&'static str; 3] = ["Date", "Description", "Amount"];

    /// Lay candidates out as a three-column table.
    pub fn into_table(candidates: Vec<TransactionCandidate>) -> RawTable {
        let header = Self::HEADER.iter().map(|h| h.to_string()).collect();
        let rows = candidates
            .into_iter()
            .map(|c| vec![c.date_text, c.description, c.amount.to_string()])
            .collect();
        RawTable::new(header, rows)
    }
}
