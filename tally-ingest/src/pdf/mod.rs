//! PDF statement extraction: text layer first, OCR only when the text layer
//! is empty, then either line parsing or a cell grid depending on strategy.

pub mod ocr;
pub mod table;
pub mod text_layer;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::IngestError;
use crate::line_parser::parse_lines;
use crate::types::{RawTable, TextLine, TransactionCandidate};

pub use ocr::{OcrEngine, TesseractEngine, ocr_pages, page_count};
pub use text_layer::{has_text, pages_to_lines, text_layer_pages};

/// How recovered PDF text is turned into rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfStrategy {
    /// Each line is parsed independently for a date and an amount.
    #[default]
    Lines,
    /// Lines are split into an aligned cell grid with its own header row.
    Table,
}

impl std::str::FromStr for PdfStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lines" | "text" => Ok(PdfStrategy::Lines),
            "table" => Ok(PdfStrategy::Table),
            other => Err(format!("unknown PDF strategy: {other} (expected lines|table)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    TextLayer,
    Ocr,
}

/// Lines recovered from a PDF together with where they came from
#[derive(Debug, Clone)]
pub struct RecoveredText {
    pub source: TextSource,
    pub lines: Vec<TextLine>,
}

/// Pick the text layer when it has any text, otherwise run `ocr` once.
pub fn choose_pages<F>(text_pages: Vec<String>, ocr: F) -> Result<(TextSource, Vec<String>), IngestError>
where
    F: FnOnce() -> Result<Vec<String>, IngestError>,
{
    if has_text(&text_pages) {
        return Ok((TextSource::TextLayer, text_pages));
    }
    info!("PDF has no text layer; falling back to OCR");
    Ok((TextSource::Ocr, ocr()?))
}

/// Recover text lines from PDF bytes.
pub fn recover_text(bytes: &[u8], engine: &dyn OcrEngine) -> Result<RecoveredText, IngestError> {
    let (source, pages) = choose_pages(text_layer_pages(bytes), || ocr_pages(bytes, engine))?;
    let lines = pages_to_lines(&pages);
    info!(?source, pages = pages.len(), lines = lines.len(), "recovered PDF text");
    Ok(RecoveredText { source, lines })
}

/// Turn recovered lines into a raw table according to `strategy`.
pub fn lines_to_raw_table(lines: &[TextLine], strategy: PdfStrategy) -> RawTable {
    if strategy == PdfStrategy::Table {
        if let Some(table) = table::lines_to_table(lines) {
            return table;
        }
        debug!("no table header found in PDF text; using line parser");
    }
    TransactionCandidate::into_table(parse_lines(lines))
}

/// Extract a raw table from PDF bytes.
pub fn extract_pdf_table(
    bytes: &[u8],
    strategy: PdfStrategy,
    engine: &dyn OcrEngine,
) -> Result<RawTable, IngestError> {
    let recovered = recover_text(bytes, engine)?;
    Ok(lines_to_raw_table(&recovered.lines, strategy))
}
