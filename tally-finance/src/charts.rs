//! Chart series: expenses per category and cumulative cash flow.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tally_core::{Category, TransactionTable};

/// Absolute outflow per category, only for negative amounts.
pub fn expense_by_category(table: &TransactionTable) -> BTreeMap<Category, f64> {
    let mut out: BTreeMap<Category, f64> = BTreeMap::new();
    for txn in table.iter() {
        if let Some(amount) = txn.amount.filter(|a| *a < 0.0) {
            *out.entry(txn.category).or_insert(0.0) += amount;
        }
    }
    out.values_mut().for_each(|v| *v = v.abs());
    out
}

/// Net amount per date, sorted by date, as a running total.
pub fn cumulative_cash_flow(table: &TransactionTable) -> Vec<(NaiveDate, f64)> {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for txn in table.iter() {
        *per_day.entry(txn.date).or_insert(0.0) += txn.amount_or_zero();
    }

    let mut running = 0.0;
    per_day
        .into_iter()
        .map(|(date, net)| {
            running += net;
            (date, running)
        })
        .collect()
}

/// Horizontal text bars scaled so the largest value spans `width` cells.
pub fn render_bars<'a>(series: impl IntoIterator<Item = (&'a str, f64)>, width: usize) -> String {
    let series: Vec<(&str, f64)> = series.into_iter().collect();
    let max = series.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);
    let label_width = series.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

    let mut s = String::new();
    for (label, value) in &series {
        let len = if max > 0.0 {
            ((value.abs() / max) * width as f64).round() as usize
        } else {
            0
        };
        s.push_str(&format!(
            "{:<label_width$} | {} {:.2}\n",
            label,
            "#".repeat(len),
            value
        ));
    }
    s
}
