//! Exporters: transactions and statements as CSV, the summary as JSON, and a
//! one-page PDF report.

use anyhow::{Context, Result, anyhow};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::Write;
use tally_core::TransactionTable;
use tracing::info;

use crate::statements::FinancialSummary;

pub const REPORT_TITLE: &str = "Financial Report";

/// `1234567.891` -> `1,234,567.89`
pub fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0.00" reads as noise
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Date, Description, Amount, Category, then any extra columns.
pub fn write_transactions_csv<W: Write>(table: &TransactionTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Date", "Description", "Amount", "Category"];
    header.extend(table.extra_headers.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for txn in table.iter() {
        let mut record = vec![
            txn.date.format("%Y-%m-%d").to_string(),
            txn.description.clone(),
            txn.amount.map(|a| format!("{a:.2}")).unwrap_or_default(),
            txn.category.label().to_string(),
        ];
        record.extend(txn.extras.iter().cloned());
        wtr.write_record(&record)?;
    }

    wtr.flush().context("flush transactions csv")?;
    Ok(())
}

/// Metric,Value rows: the nine headline metrics followed by the ratios.
pub fn write_statements_csv<W: Write>(summary: &FinancialSummary, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Metric", "Value"])?;
    for (label, value) in summary.metrics().iter().chain(summary.ratios.rows().iter()) {
        wtr.write_record([label.to_string(), format!("{value:.2}")])?;
    }
    wtr.flush().context("flush statements csv")?;
    Ok(())
}

pub fn write_summary_json<W: Write>(summary: &FinancialSummary, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, summary).context("serialize summary")?;
    Ok(())
}

fn report_lines(summary: &FinancialSummary) -> Vec<String> {
    summary
        .metrics()
        .iter()
        .map(|(label, value)| format!("{label}: {}", format_money(*value)))
        .collect()
}

fn build_report(summary: &FinancialSummary) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 16.into()]),
        Operation::new("TL", vec![20.into()]),
        Operation::new("Td", vec![72.into(), 770.into()]),
        Operation::new("Tj", vec![Object::string_literal(REPORT_TITLE)]),
        Operation::new("T*", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
    ];
    for line in report_lines(summary) {
        operations.push(Operation::new("T*", vec![]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations }
        .encode()
        .map_err(|e| anyhow!("encode report page: {e}"))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    Ok(doc)
}

/// Render the one-page report and return its bytes.
///
/// The document is written to a temporary file first and read back; the file
/// is removed when this returns, whether or not rendering succeeded.
pub fn render_pdf_report(summary: &FinancialSummary) -> Result<Vec<u8>> {
    let mut doc = build_report(summary)?;

    let tmp = tempfile::Builder::new()
        .prefix("tally-report-")
        .suffix(".pdf")
        .tempfile()
        .context("create temporary report file")?;
    doc.save(tmp.path())
        .with_context(|| format!("write report to {}", tmp.path().display()))?;
    let bytes = std::fs::read(tmp.path())
        .with_context(|| format!("read report back from {}", tmp.path().display()))?;

    info!(bytes = bytes.len(), "rendered pdf report");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statements::ValuationMultiples;
    use chrono::NaiveDate;
    use tally_core::{Category, Transaction};

    fn table() -> TransactionTable {
        let d = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
        let mut sale = Transaction::new(d, "Invoice, March", Some(1250.0))
            .with_extras(vec!["R1".to_string()]);
        sale.category = Category::SalesIncome;
        let mut rent = Transaction::new(d, "Office rent", Some(-900.0))
            .with_extras(vec!["R2".to_string()]);
        rent.category = Category::RentExpense;
        let blank = Transaction::new(d, "Unknown", None).with_extras(vec![String::new()]);
        let mut t = TransactionTable::new(vec![sale, rent, blank]);
        t.extra_headers = vec!["Reference".to_string()];
        t
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(999.999), "1,000.00");
        assert_eq!(format_money(1234567.891), "1,234,567.89");
        assert_eq!(format_money(-1500.5), "-1,500.50");
        assert_eq!(format_money(-0.001), "0.00");
        assert_eq!(format_money(100.0), "100.00");
    }

    #[test]
    fn test_write_transactions_csv() {
        let mut out = Vec::new();
        write_transactions_csv(&table(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Date,Description,Amount,Category,Reference");
        assert_eq!(lines[1], "2025-09-02,\"Invoice, March\",1250.00,Sales Income,R1");
        assert_eq!(lines[2], "2025-09-02,Office rent,-900.00,Rent Expense,R2");
        assert_eq!(lines[3], "2025-09-02,Unknown,,Uncategorized,");
    }

    #[test]
    fn test_write_statements_csv() {
        let summary = FinancialSummary::from_table(&table(), &ValuationMultiples::default());
        let mut out = Vec::new();
        write_statements_csv(&summary, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Metric,Value");
        assert_eq!(lines[1], "Revenue,1250.00");
        assert_eq!(lines.len(), 1 + 9 + 3);
    }

    #[test]
    fn test_write_summary_json() {
        let summary = FinancialSummary::from_table(&table(), &ValuationMultiples::default());
        let mut out = Vec::new();
        write_summary_json(&summary, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["income_statement"]["revenue"], 1250.0);
        assert_eq!(value["balance_sheet"]["liabilities"], 900.0);
    }

    #[test]
    fn test_render_pdf_report() {
        let summary = FinancialSummary::from_table(&table(), &ValuationMultiples::default());
        let bytes = render_pdf_report(&summary).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        let page_id = *doc.get_pages().get(&1).unwrap();
        let content = doc.get_and_decode_page_content(page_id).unwrap();
        let texts: Vec<String> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| op.operands.first())
            .filter_map(|o| o.as_str().ok())
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect();
        assert_eq!(texts[0], REPORT_TITLE);
        assert_eq!(texts[1], "Revenue: 1,250.00");
        assert_eq!(texts.len(), 10);
    }

    #[test]
    fn test_report_lines() {
        let summary = FinancialSummary::from_table(&table(), &ValuationMultiples::default());
        let lines = report_lines(&summary);
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[2], "Net Profit: 350.00");
    }
}
