//! Single-shot statement → transaction table pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_core::TransactionTable;
use tracing::info;

use crate::encoding::{decode_text, encoding_for_label};
use crate::error::IngestError;
use crate::normalize::{NormalizeMode, normalize};
use crate::pdf::ocr::{DEFAULT_OCR_DPI, DEFAULT_OCR_LANGUAGE};
use crate::pdf::{OcrEngine, PdfStrategy, TesseractEngine, extract_pdf_table};
use crate::tabular::{load_csv, load_spreadsheet};
use crate::types::{DocumentKind, RawDocument};

/// Knobs for one ingest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    pub pdf_strategy: PdfStrategy,
    pub normalize_mode: NormalizeMode,
    /// Encoding label used when detection is not confident enough
    pub fallback_encoding: String,
    pub min_encoding_confidence: f32,
    pub ocr_language: String,
    pub ocr_dpi: u32,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            pdf_strategy: PdfStrategy::Lines,
            normalize_mode: NormalizeMode::Lenient,
            fallback_encoding: "utf-8".to_string(),
            min_encoding_confidence: 0.5,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            ocr_dpi: DEFAULT_OCR_DPI,
        }
    }
}

/// Runs documents through the pipeline with fixed options and OCR engine.
pub struct Ingestor {
    options: IngestOptions,
    ocr: Box<dyn OcrEngine>,
}

impl Ingestor {
    pub fn new(options: IngestOptions) -> Self {
        let ocr = Box::new(TesseractEngine::new(&options.ocr_language, options.ocr_dpi));
        Self { options, ocr }
    }

    /// Replace the OCR engine used for image-only PDFs.
    pub fn with_ocr_engine(mut self, engine: Box<dyn OcrEngine>) -> Self {
        self.ocr = engine;
        self
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Extract and normalize the transactions of one document.
    pub fn ingest(&self, doc: &RawDocument) -> Result<TransactionTable, IngestError> {
        let raw = match doc.kind() {
            DocumentKind::Csv => {
                let text = decode_text(
                    doc.bytes(),
                    encoding_for_label(&self.options.fallback_encoding),
                    self.options.min_encoding_confidence,
                );
                load_csv(&text)?
            }
            DocumentKind::Spreadsheet => load_spreadsheet(doc.bytes())?,
            DocumentKind::Pdf => {
                extract_pdf_table(doc.bytes(), self.options.pdf_strategy, self.ocr.as_ref())?
            }
        };

        let table = normalize(&raw, self.options.normalize_mode)?;
        if doc.kind() == DocumentKind::Pdf && table.is_empty() {
            return Err(IngestError::PdfExtractionFailure);
        }

        info!(
            file = doc.filename(),
            kind = ?doc.kind(),
            rows = raw.rows.len(),
            transactions = table.len(),
            "ingested statement"
        );
        Ok(table)
    }

    /// Read `path` and ingest it.
    pub fn ingest_path(&self, path: impl AsRef<Path>) -> Result<TransactionTable, IngestError> {
        let doc = RawDocument::from_path(path)?;
        self.ingest(&doc)
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(IngestOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::{ScriptedOcr, blank_pdf, text_pdf};

    #[test]
    fn test_csv_document() {
        let doc = RawDocument::new(
            "stmt.csv",
            b"Date,Description,Amount\n01/02/2025,Coffee,-3.50\nN/A,Total,100\n".to_vec(),
        )
        .unwrap();
        let table = Ingestor::default().ingest(&doc).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.transactions[0].amount, Some(-3.5));
    }

    #[test]
    fn test_scanned_pdf_uses_ocr_text() {
        let doc = RawDocument::new("scan.pdf", blank_pdf(2)).unwrap();
        let engine = ScriptedOcr::new(&[
            "ACME BANK\n01/09/2025 Shell Fuel -60.00",
            "02/09/2025 Client payment 1,200.00\nPage 2 of 2",
        ]);
        let table = Ingestor::default()
            .with_ocr_engine(Box::new(engine))
            .ingest(&doc)
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.transactions[0].description, "Shell Fuel");
        assert_eq!(table.transactions[1].amount, Some(1200.0));
    }

    #[test]
    fn test_pdf_without_transactions_fails() {
        let doc = RawDocument::new("scan.pdf", blank_pdf(1)).unwrap();
        let engine = ScriptedOcr::new(&["Nothing to see here"]);
        let err = Ingestor::default()
            .with_ocr_engine(Box::new(engine))
            .ingest(&doc)
            .unwrap_err();
        assert!(matches!(err, IngestError::PdfExtractionFailure));
    }

    #[test]
    fn test_text_pdf_ingests_without_ocr() {
        let doc = RawDocument::new(
            "march.pdf",
            text_pdf(&["Statement for March", "01/02/2025 Grocery Store 1,234.56"]),
        )
        .unwrap();
        let engine = ScriptedOcr::new(&["01/01/2025 Scanned text 9.99"]);
        let calls = engine.calls.clone();

        let table = Ingestor::default()
            .with_ocr_engine(Box::new(engine))
            .ingest(&doc)
            .unwrap();
        assert_eq!(table.len(), 1);
        let txn = &table.transactions[0];
        assert_eq!(txn.date, chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(txn.description, "Grocery Store");
        assert_eq!(txn.amount, Some(1234.56));
        assert!(calls.lock().unwrap().is_empty());
    }
}
