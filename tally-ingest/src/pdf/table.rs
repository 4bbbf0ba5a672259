//! Layout-based cell grid for PDF statements that print aligned columns.
//!
//! Cells are separated by runs of two or more spaces (or tabs). The first
//! row with a Date-like cell is taken as the header; repeated page headers
//! are skipped. Body cells land in the header column they sit under, so an
//! empty Debit cell does not shift the Credit value left.

use regex::Regex;
use std::cmp::Reverse;
use std::sync::OnceLock;

use crate::normalize::{CanonicalColumn, resolve_column};
use crate::types::{RawTable, TextLine};

fn cell_gap_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\t+|\s{2,}").expect("cell gap regex"))
}

/// A cell and the character columns `[start, end)` it occupies on its line.
#[derive(Debug, Clone, PartialEq)]
struct Cell {
    start: usize,
    end: usize,
    text: String,
}

fn positioned_cells(line: &str) -> Vec<Cell> {
    let column = |byte: usize| line[..byte].chars().count();

    let mut cells = Vec::new();
    let mut seg_start = 0;
    let gaps = cell_gap_re()
        .find_iter(line)
        .map(|m| m.range())
        .chain(std::iter::once(line.len()..line.len()));
    for gap in gaps {
        let segment = &line[seg_start..gap.start];
        let text = segment.trim();
        if !text.is_empty() {
            let lead = segment.len() - segment.trim_start().len();
            let start = seg_start + lead;
            cells.push(Cell {
                start: column(start),
                end: column(start + text.len()),
                text: text.to_string(),
            });
        }
        seg_start = gap.end;
    }
    cells
}

/// Split a line into cells on wide gaps.
pub fn split_cells(line: &str) -> Vec<String> {
    positioned_cells(line).into_iter().map(|c| c.text).collect()
}

/// Header column a body cell belongs to: the one it overlaps most, else the
/// nearest one, leftmost on ties.
fn column_for(cell: &Cell, header: &[Cell]) -> usize {
    let overlap = |h: &Cell| cell.end.min(h.end).saturating_sub(cell.start.max(h.start));
    let distance = |h: &Cell| {
        if cell.end <= h.start {
            h.start - cell.end
        } else {
            cell.start.saturating_sub(h.end)
        }
    };
    (0..header.len())
        .max_by_key(|&i| (overlap(&header[i]), Reverse(distance(&header[i])), Reverse(i)))
        .unwrap_or(0)
}

fn place_row(cells: Vec<Cell>, header: &[Cell]) -> Vec<String> {
    let mut row = vec![String::new(); header.len()];
    for cell in cells {
        let slot = &mut row[column_for(&cell, header)];
        if !slot.is_empty() {
            slot.push(' ');
        }
        slot.push_str(&cell.text);
    }
    row
}

/// Build a table from aligned lines, or `None` when no header row is found.
pub fn lines_to_table(lines: &[TextLine]) -> Option<RawTable> {
    let rows: Vec<Vec<Cell>> = lines.iter().map(|l| positioned_cells(&l.text)).collect();

    let header_pos = rows.iter().position(|row| {
        row.len() >= 2
            && row
                .iter()
                .any(|c| resolve_column(&c.text) == Some(CanonicalColumn::Date))
    })?;
    let header_cells = rows[header_pos].clone();
    let header: Vec<String> = header_cells.iter().map(|c| c.text.clone()).collect();

    let body = rows
        .into_iter()
        .skip(header_pos + 1)
        .filter(|row| row.len() >= 2)
        .filter(|row| !row.iter().map(|c| &c.text).eq(header.iter()))
        .map(|row| place_row(row, &header_cells))
        .collect();

    Some(RawTable::new(header, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_line() -> String {
        format!("{:<12}{:<19}{:<10}{}", "Date", "Details", "Debit", "Credit")
    }

    fn statement() -> Vec<TextLine> {
        vec![
            TextLine::new(1, "ACME BANK STATEMENT"),
            TextLine::new(1, header_line()),
            TextLine::new(1, format!("{:<12}{:<19}{}", "01/09/2025", "Coffee", "3.20")),
            TextLine::new(
                1,
                format!("{:<12}{:<19}{:<10}{:>6}", "02/09/2025", "Invoice 44", "", "150.00"),
            ),
            TextLine::new(2, header_line()),
            TextLine::new(2, format!("{:<12}{:<19}{:>6}", "03/09/2025", "Rent  April", "900.00")),
        ]
    }

    #[test]
    fn test_split_cells() {
        assert_eq!(
            split_cells("  04/22     Discover E-Payment   -15.00\t53.70 "),
            vec!["04/22", "Discover E-Payment", "-15.00", "53.70"]
        );
    }

    #[test]
    fn test_positioned_cells() {
        let cells = positioned_cells("01/09/2025  Café  3.20");
        assert_eq!(cells[0].start..cells[0].end, 0..10);
        assert_eq!(cells[1].start..cells[1].end, 12..16);
        // columns count characters, not bytes
        assert_eq!(cells[2].start, 18);
    }

    #[test]
    fn test_lines_to_table() {
        let table = lines_to_table(&statement()).unwrap();
        assert_eq!(table.header, vec!["Date", "Details", "Debit", "Credit"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], vec!["01/09/2025", "Coffee", "3.20", ""]);
        assert_eq!(table.rows[1], vec!["02/09/2025", "Invoice 44", "", "150.00"]);
        assert_eq!(table.rows[2], vec!["03/09/2025", "Rent April", "900.00", ""]);
    }

    #[test]
    fn test_right_aligned_amount_stays_under_its_header() {
        let lines = vec![
            TextLine::new(1, format!("{:<12}{:<14}{:>8}", "Date", "Description", "Amount")),
            TextLine::new(1, format!("{:<12}{:<14}{:>8}", "01/09/2025", "Coffee", "-3.20")),
        ];
        let table = lines_to_table(&lines).unwrap();
        assert_eq!(table.rows, vec![vec!["01/09/2025", "Coffee", "-3.20"]]);
    }

    #[test]
    fn test_no_header_row() {
        let lines = vec![
            TextLine::new(1, "01/09/2025 Coffee -3.20"),
            TextLine::new(1, "Page 1 of 1"),
        ];
        assert!(lines_to_table(&lines).is_none());
    }
}
