use chrono::NaiveDate;
use std::path::PathBuf;
use tally_core::{Category, TransactionTable};
use tally_finance::{
    FinancialSummary, ValuationMultiples, categorize_table, cumulative_cash_flow,
    expense_by_category, render_pdf_report, write_statements_csv, write_transactions_csv,
};
use tally_ingest::Ingestor;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("september.csv")
}

fn categorized() -> TransactionTable {
    let mut table = Ingestor::default().ingest_path(&fixture_path()).unwrap();
    categorize_table(&mut table);
    table
}

#[test]
fn test_categories_from_statement() {
    let table = categorized();
    assert_eq!(table.len(), 6);
    let cats: Vec<_> = table.iter().map(|t| t.category).collect();
    assert_eq!(
        cats,
        vec![
            Category::SalesIncome,
            Category::FuelExpense,
            Category::PayrollExpense,
            Category::RentExpense,
            Category::Tax,
            Category::OtherExpense,
        ]
    );
}

#[test]
fn test_summary_from_statement() {
    let s = FinancialSummary::from_table(&categorized(), &ValuationMultiples::default());
    assert_eq!(s.income_statement.revenue, 2000.0);
    assert_eq!(s.income_statement.expenses, -1800.0);
    assert_eq!(s.income_statement.net_profit, 200.0);
    assert_eq!(s.balance_sheet.assets, 50.0);
    assert_eq!(s.balance_sheet.liabilities, 1800.0);
    assert_eq!(s.balance_sheet.equity, -1750.0);
    assert!((s.ratios.net_profit_margin_pct - 10.0).abs() < 1e-9);
    assert_eq!(s.valuation.dcf_ev, 1000.0);
    assert_eq!(s.valuation.revenue_multiple_ev, 3000.0);
}

#[test]
fn test_custom_multiples() {
    let multiples = ValuationMultiples {
        dcf_multiple: 10.0,
        ..ValuationMultiples::default()
    };
    let s = FinancialSummary::from_table(&categorized(), &multiples);
    assert_eq!(s.valuation.dcf_ev, 2000.0);
    assert_eq!(s.valuation.ev_ebitda, 1200.0);
}

#[test]
fn test_chart_series_from_statement() {
    let table = categorized();
    let by_cat = expense_by_category(&table);
    assert_eq!(by_cat[&Category::PayrollExpense], 1200.0);
    assert_eq!(by_cat[&Category::Tax], 150.0);
    assert!(!by_cat.contains_key(&Category::SalesIncome));

    let flow = cumulative_cash_flow(&table);
    assert_eq!(flow.first(), Some(&(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(), 2000.0)));
    assert_eq!(flow.last().map(|(_, v)| *v), Some(50.0));
}

#[test]
fn test_exports_to_directory() {
    let table = categorized();
    let summary = FinancialSummary::from_table(&table, &ValuationMultiples::default());
    let dir = tempfile::tempdir().unwrap();

    let txn_path = dir.path().join("transactions.csv");
    write_transactions_csv(&table, std::fs::File::create(&txn_path).unwrap()).unwrap();
    let stmt_path = dir.path().join("statements.csv");
    write_statements_csv(&summary, std::fs::File::create(&stmt_path).unwrap()).unwrap();

    let txns = std::fs::read_to_string(&txn_path).unwrap();
    assert!(txns.starts_with("Date,Description,Amount,Category,Reference\n"));
    assert_eq!(txns.lines().count(), 7);
    let stmts = std::fs::read_to_string(&stmt_path).unwrap();
    assert!(stmts.contains("Net Profit,200.00"));

    let pdf = render_pdf_report(&summary).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}
