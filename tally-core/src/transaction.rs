//! Canonical transaction types handed from the ingest pipeline to consumers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single normalized statement row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Calendar date of the transaction (always valid)
    pub date: NaiveDate,
    /// Human-readable description
    pub description: String,
    /// Positive = money in, negative = money out, `None` = cell was not numeric
    pub amount: Option<f64>,
    /// Assigned by the finance categorizer; `Uncategorized` out of ingest
    pub category: Category,
    /// Cells of columns that did not resolve to the canonical schema,
    /// aligned with [`TransactionTable::extra_headers`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
}

/// Transaction categories matched deterministically
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "sales-income")]
    SalesIncome,
    #[serde(rename = "fuel-expense")]
    FuelExpense,
    #[serde(rename = "payroll-expense")]
    PayrollExpense,
    #[serde(rename = "rent-expense")]
    RentExpense,
    #[serde(rename = "tax")]
    Tax,
    #[serde(rename = "other-expense")]
    OtherExpense,
    #[serde(rename = "uncategorized")]
    Uncategorized,
}

impl Category {
    /// Display label used in reports and exports
    pub fn label(&self) -> &'static str {
        match self {
            Category::SalesIncome => "Sales Income",
            Category::FuelExpense => "Fuel Expense",
            Category::PayrollExpense => "Payroll Expense",
            Category::RentExpense => "Rent Expense",
            Category::Tax => "Tax",
            Category::OtherExpense => "Other Expense",
            Category::Uncategorized => "Uncategorized",
        }
    }

    /// Buckets summed into the income statement's expense line (`Tax` is not one)
    pub fn is_expense(&self) -> bool {
        matches!(
            self,
            Category::FuelExpense
                | Category::PayrollExpense
                | Category::RentExpense
                | Category::OtherExpense
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Transaction {
    /// Create an uncategorized transaction with no extra cells
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: Option<f64>) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            category: Category::Uncategorized,
            extras: Vec::new(),
        }
    }

    /// Builder: attach extra column cells
    pub fn with_extras(mut self, extras: Vec<String>) -> Self {
        self.extras = extras;
        self
    }

    /// Returns true if money went out
    pub fn is_expense(&self) -> bool {
        self.amount.is_some_and(|a| a < 0.0)
    }

    /// Returns true if money came in
    pub fn is_income(&self) -> bool {
        self.amount.is_some_and(|a| a > 0.0)
    }

    /// Amount with the missing marker read as zero
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }
}

/// Ordered output of the ingest pipeline. Encounter order is preserved and
/// rows are never merged or deduplicated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionTable {
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_headers: Vec<String>,
}

impl TransactionTable {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            extra_headers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    /// Sum of all amounts; missing amounts are skipped
    pub fn total_amount(&self) -> f64 {
        self.transactions.iter().filter_map(|t| t.amount).sum()
    }
}

impl<'a> IntoIterator for &'a TransactionTable {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    #[test]
    fn test_transaction_creation() {
        let txn = Transaction::new(day(2), "Shell station", Some(-45.0));
        assert!(txn.is_expense());
        assert!(!txn.is_income());
        assert_eq!(txn.category, Category::Uncategorized);
    }

    #[test]
    fn test_missing_amount_is_neither_side() {
        let txn = Transaction::new(day(3), "???", None);
        assert!(!txn.is_expense());
        assert!(!txn.is_income());
        assert_eq!(txn.amount_or_zero(), 0.0);
    }

    #[test]
    fn test_total_skips_missing() {
        let table = TransactionTable::new(vec![
            Transaction::new(day(1), "a", Some(100.0)),
            Transaction::new(day(2), "b", None),
            Transaction::new(day(3), "c", Some(-40.5)),
        ]);
        assert_eq!(table.len(), 3);
        assert!((table.total_amount() - 59.5).abs() < 1e-9);
    }

    #[test]
    fn test_expense_categories() {
        assert!(Category::FuelExpense.is_expense());
        assert!(Category::OtherExpense.is_expense());
        assert!(!Category::Tax.is_expense());
        assert!(!Category::SalesIncome.is_expense());
    }

    #[test]
    fn test_category_serde_labels() {
        let json = serde_json::to_string(&Category::PayrollExpense).unwrap();
        assert_eq!(json, "\"payroll-expense\"");
        assert_eq!(Category::RentExpense.to_string(), "Rent Expense");
    }
}
