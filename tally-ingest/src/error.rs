//! Failure conditions surfaced to the caller as stop-the-request messages.
//!
//! Per-row problems (a line with no date/amount, a date that does not
//! parse) are never errors; they are filtered where they occur.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file format: {filename} (upload CSV, Excel, or PDF)")]
    UnsupportedFormat { filename: String },

    #[error("Unable to parse table: {0}")]
    MalformedTable(String),

    #[error("Could not parse any transactions from this PDF. Try exporting CSV/Excel instead.")]
    PdfExtractionFailure,

    #[error("No valid {} column detected", .0.join("/"))]
    MissingRequiredColumn(Vec<&'static str>),

    #[error("OCR not available: {0}")]
    OcrUnavailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for IngestError {
    fn from(e: csv::Error) -> Self {
        IngestError::MalformedTable(e.to_string())
    }
}

impl From<calamine::Error> for IngestError {
    fn from(e: calamine::Error) -> Self {
        IngestError::MalformedTable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message() {
        let err = IngestError::MissingRequiredColumn(vec!["Date", "Amount"]);
        assert_eq!(err.to_string(), "No valid Date/Amount column detected");
    }
}
