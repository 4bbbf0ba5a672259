//! Deterministic category rules over description keywords and amount sign.
//!
//! First matching rule wins; description keywords outrank the sign check.

use tally_core::{Category, Transaction, TransactionTable};

/// Categorize a single description/amount pair.
pub fn categorize(description: &str, amount: Option<f64>) -> Category {
    let desc = description.to_lowercase();

    if desc.contains("shell") || desc.contains("fuel") {
        return Category::FuelExpense;
    }

    if desc.contains("salary") || desc.contains("payroll") {
        return Category::PayrollExpense;
    }

    if desc.contains("rent") {
        return Category::RentExpense;
    }

    if ["tax", "vat"].iter().any(|k| desc.contains(k)) {
        return Category::Tax;
    }

    if amount.is_some_and(|a| a > 0.0) {
        return Category::SalesIncome;
    }

    Category::OtherExpense
}

/// Categorize a transaction in place.
pub fn categorize_transaction(txn: &mut Transaction) {
    txn.category = categorize(&txn.description, txn.amount);
}

/// Assign a category to every row of the table.
pub fn categorize_table(table: &mut TransactionTable) {
    for txn in table.transactions.iter_mut() {
        categorize_transaction(txn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_keyword_rules() {
        assert_eq!(categorize("SHELL OIL 1234", Some(-50.0)), Category::FuelExpense);
        assert_eq!(categorize("Fuel card", Some(-20.0)), Category::FuelExpense);
        assert_eq!(categorize("March payroll", Some(-3000.0)), Category::PayrollExpense);
        assert_eq!(categorize("Salary J. Doe", Some(-2000.0)), Category::PayrollExpense);
        assert_eq!(categorize("Office RENT", Some(-900.0)), Category::RentExpense);
        assert_eq!(categorize("HMRC VAT return", Some(-400.0)), Category::Tax);
    }

    #[test]
    fn test_keywords_outrank_sign() {
        // a fuel refund is still fuel
        assert_eq!(categorize("Shell refund", Some(15.0)), Category::FuelExpense);
        assert_eq!(categorize("Tax refund", Some(300.0)), Category::Tax);
    }

    #[test]
    fn test_sign_fallback() {
        assert_eq!(categorize("Client payment", Some(1200.0)), Category::SalesIncome);
        assert_eq!(categorize("Coffee", Some(-3.2)), Category::OtherExpense);
        assert_eq!(categorize("Unknown", None), Category::OtherExpense);
        assert_eq!(categorize("Zero", Some(0.0)), Category::OtherExpense);
    }

    #[test]
    fn test_categorize_table() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
        let mut table = TransactionTable::new(vec![
            Transaction::new(date, "Payroll", Some(-10.0)),
            Transaction::new(date, "Invoice", Some(10.0)),
        ]);
        categorize_table(&mut table);
        assert_eq!(table.transactions[0].category, Category::PayrollExpense);
        assert_eq!(table.transactions[1].category, Category::SalesIncome);
    }
}
