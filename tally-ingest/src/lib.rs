//! tally-ingest: statement ingestion (CSV, spreadsheet, PDF text layer, OCR)
//! and normalization into the canonical transaction table.

pub mod dates;
pub mod encoding;
pub mod error;
pub mod line_parser;
pub mod normalize;
pub mod pdf;
pub mod pipeline;
pub mod tabular;
pub mod types;

pub use error::IngestError;
pub use line_parser::{parse_line, parse_lines};
pub use normalize::{NormalizeMode, normalize};
pub use pdf::{OcrEngine, PdfStrategy, TesseractEngine};
pub use pipeline::{IngestOptions, Ingestor};
pub use types::{DocumentKind, RawDocument, RawTable, TextLine, TransactionCandidate};
