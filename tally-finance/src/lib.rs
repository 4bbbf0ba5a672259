//! tally-finance: category rules, simplified statements, chart series and exporters

pub mod category_rules;
pub mod charts;
pub mod export;
pub mod statements;

pub use category_rules::{categorize, categorize_table};
pub use charts::{cumulative_cash_flow, expense_by_category, render_bars};
pub use export::{
    format_money, render_pdf_report, write_statements_csv, write_summary_json,
    write_transactions_csv,
};
pub use statements::{
    BalanceSheet, FinancialSummary, IncomeStatement, Ratios, Valuation, ValuationMultiples,
};
