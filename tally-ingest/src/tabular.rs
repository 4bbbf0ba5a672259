//! CSV and spreadsheet readers producing a [`RawTable`].
//!
//! The first row is always taken as the header. Structural problems are
//! surfaced as [`IngestError::MalformedTable`]; nothing is repaired here.

use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use tracing::info;

use crate::error::IngestError;
use crate::types::RawTable;

/// Parse decoded CSV text.
pub fn load_csv(text: &str) -> Result<RawTable, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if header.iter().all(|h| h.is_empty()) {
        return Err(IngestError::MalformedTable("CSV has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        // Short rows are padded later; long rows mean the structure is broken.
        if record.len() > header.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(IngestError::MalformedTable(format!(
                "Expected {} fields in line {line}, saw {}",
                header.len(),
                record.len()
            )));
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    info!(columns = header.len(), rows = rows.len(), "loaded CSV");
    Ok(RawTable::new(header, rows))
}

/// Parse `.xls`/`.xlsx`/`.ods` bytes; only the first worksheet is read.
pub fn load_spreadsheet(bytes: &[u8]) -> Result<RawTable, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::MalformedTable("workbook has no worksheets".to_string()))??;

    let mut rows = range.rows().map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    let header = rows
        .next()
        .ok_or_else(|| IngestError::MalformedTable("worksheet is empty".to_string()))?;
    let rows: Vec<Vec<String>> = rows.collect();

    info!(columns = header.len(), rows = rows.len(), "loaded spreadsheet");
    Ok(RawTable::new(header, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) | Data::DateTimeIso(text) => text.trim().to_string(),
        // Dates are handed to the normalizer in the day-first form it expects.
        Data::DateTime(_) => cell
            .as_date()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| cell.to_string()),
        _ => cell.to_string(),
    }
}
