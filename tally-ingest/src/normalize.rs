//! Column normalizer: maps arbitrarily named statement columns onto the
//! canonical Date / Description / Amount schema and validates rows.

use serde::{Deserialize, Serialize};
use tally_core::{Transaction, TransactionTable};
use tracing::debug;

use crate::dates::parse_day_first;
use crate::error::IngestError;
use crate::types::RawTable;

/// How many canonical columns must resolve before rows are accepted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    /// Only Date is required; missing Description/Amount become empty/missing.
    #[default]
    Lenient,
    /// Date, Description and Amount must all resolve.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalColumn {
    Date,
    Description,
    Amount,
}

impl CanonicalColumn {
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalColumn::Date => "Date",
            CanonicalColumn::Description => "Description",
            CanonicalColumn::Amount => "Amount",
        }
    }
}

/// Lowercase a header and drop surrounding whitespace, inner spaces and underscores.
pub fn header_key(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '_'], "")
}

/// Resolve a header onto the canonical schema. First matching rule wins.
pub fn resolve_column(name: &str) -> Option<CanonicalColumn> {
    let key = header_key(name);
    if key.contains("date") {
        Some(CanonicalColumn::Date)
    } else if ["description", "details", "transaction"]
        .iter()
        .any(|k| key.contains(k))
    {
        Some(CanonicalColumn::Description)
    } else if ["amount", "value", "debit", "credit"]
        .iter()
        .any(|k| key.contains(k))
    {
        Some(CanonicalColumn::Amount)
    } else {
        None
    }
}

/// Coerce an amount cell. Thousands commas, currency symbols and whitespace
/// are ignored and `(12.50)` reads as `-12.50`; anything else is missing.
pub fn parse_amount_cell(cell: &str) -> Option<f64> {
    let mut s = cell.trim();
    let mut negate = false;
    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negate = true;
        s = inner;
    }
    let cleaned: String = s
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '$' | '€' | '£' | '¥' | '₹'))
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negate { -value } else { value })
}

#[derive(Debug)]
struct Column {
    name: String,
    key: String,
    role: Option<CanonicalColumn>,
    cells: Vec<String>,
}

impl Column {
    fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// Normalize a raw table into the canonical transaction table.
///
/// Rows whose date does not parse are dropped silently; a table without a
/// resolvable Date column (or, in strict mode, without all three canonical
/// columns) is rejected.
pub fn normalize(table: &RawTable, mode: NormalizeMode) -> Result<TransactionTable, IngestError> {
    let row_count = table.rows.len();
    let mut columns: Vec<Column> = table
        .header
        .iter()
        .enumerate()
        .map(|(idx, name)| Column {
            name: name.trim().to_string(),
            key: header_key(name),
            role: resolve_column(name),
            cells: (0..row_count).map(|r| table.cell(r, idx).to_string()).collect(),
        })
        .collect();

    merge_debit_credit(&mut columns, row_count);

    for col in columns.iter_mut() {
        if let Some(role) = col.role {
            col.name = role.label().to_string();
            col.key = role.label().to_lowercase();
        }
    }

    if row_count > 0 {
        columns.retain(|c| !c.is_blank());
    }
    let mut seen = std::collections::HashSet::new();
    columns.retain(|c| seen.insert(c.key.clone()));

    let find = |role: CanonicalColumn| columns.iter().position(|c| c.role == Some(role));
    let date_idx = find(CanonicalColumn::Date);
    let desc_idx = find(CanonicalColumn::Description);
    let amount_idx = find(CanonicalColumn::Amount);

    let mut missing = Vec::new();
    if date_idx.is_none() {
        missing.push(CanonicalColumn::Date.label());
    }
    if mode == NormalizeMode::Strict {
        if desc_idx.is_none() {
            missing.push(CanonicalColumn::Description.label());
        }
        if amount_idx.is_none() {
            missing.push(CanonicalColumn::Amount.label());
        }
    }
    let Some(date_idx) = date_idx.filter(|_| missing.is_empty()) else {
        return Err(IngestError::MissingRequiredColumn(missing));
    };

    let extra_idx: Vec<usize> = (0..columns.len()).filter(|i| columns[*i].role.is_none()).collect();
    debug!(
        date = %columns[date_idx].name,
        description = desc_idx.is_some(),
        amount = amount_idx.is_some(),
        extras = extra_idx.len(),
        "resolved columns"
    );

    let mut transactions = Vec::with_capacity(row_count);
    for row in 0..row_count {
        let date_cell = &columns[date_idx].cells[row];
        let Some(date) = parse_day_first(date_cell) else {
            debug!(row, cell = %date_cell, "dropping row with unparsable date");
            continue;
        };
        let description = desc_idx
            .map(|i| columns[i].cells[row].trim().to_string())
            .unwrap_or_default();
        let amount = amount_idx.and_then(|i| parse_amount_cell(&columns[i].cells[row]));
        let extras = extra_idx.iter().map(|i| columns[*i].cells[row].clone()).collect();

        transactions.push(Transaction::new(date, description, amount).with_extras(extras));
    }

    Ok(TransactionTable {
        transactions,
        extra_headers: extra_idx.iter().map(|i| columns[*i].name.clone()).collect(),
    })
}

/// Replace a debit/credit column pair by a single `credit - debit` Amount
/// column placed where the first of the pair was. Other Amount-like columns
/// are dropped so the synthesized one is authoritative.
fn merge_debit_credit(columns: &mut Vec<Column>, row_count: usize) {
    let debit = columns.iter().position(|c| c.key.contains("debit"));
    let credit = columns.iter().position(|c| c.key.contains("credit"));
    let (Some(debit), Some(credit)) = (debit, credit) else {
        return;
    };
    if debit == credit {
        return;
    }

    let cells: Vec<String> = (0..row_count)
        .map(|r| {
            let d = parse_amount_cell(&columns[debit].cells[r]).unwrap_or(0.0);
            let c = parse_amount_cell(&columns[credit].cells[r]).unwrap_or(0.0);
            (c - d).to_string()
        })
        .collect();
    let at = debit.min(credit);
    debug!(debit = %columns[debit].name, credit = %columns[credit].name, "synthesizing Amount from debit/credit");

    let mut merged = Vec::with_capacity(columns.len());
    for (idx, col) in columns.drain(..).enumerate() {
        if idx == at {
            merged.push(Column {
                name: CanonicalColumn::Amount.label().to_string(),
                key: "amount".to_string(),
                role: Some(CanonicalColumn::Amount),
                cells: cells.clone(),
            });
        }
        if col.role != Some(CanonicalColumn::Amount) {
            merged.push(col);
        }
    }
    *columns = merged;
}
