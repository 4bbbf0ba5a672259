//! Simplified financial statements, ratios and valuation proxies derived
//! from a categorized transaction table.

use serde::{Deserialize, Serialize};
use tally_core::{Category, TransactionTable};

/// Multiples applied by the valuation proxies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationMultiples {
    pub dcf_multiple: f64,
    pub ebitda_multiple: f64,
    pub revenue_multiple: f64,
}

impl Default for ValuationMultiples {
    fn default() -> Self {
        Self {
            dcf_multiple: 5.0,
            ebitda_multiple: 6.0,
            revenue_multiple: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub revenue: f64,
    /// Sum of expense-category amounts (negative when money went out)
    pub expenses: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub assets: f64,
    pub liabilities: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ratios {
    pub net_profit_margin_pct: f64,
    pub debt_to_equity: f64,
    pub equity_ratio_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub dcf_ev: f64,
    pub ev_ebitda: f64,
    pub revenue_multiple_ev: f64,
}

/// Everything the report and exporters print
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub income_statement: IncomeStatement,
    pub balance_sheet: BalanceSheet,
    pub ratios: Ratios,
    pub valuation: Valuation,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

impl IncomeStatement {
    pub fn from_table(table: &TransactionTable) -> Self {
        let revenue = table
            .iter()
            .filter(|t| t.category == Category::SalesIncome)
            .filter_map(|t| t.amount)
            .sum();
        let expenses = table
            .iter()
            .filter(|t| t.category.is_expense())
            .filter_map(|t| t.amount)
            .sum();
        Self {
            revenue,
            expenses,
            net_profit: revenue + expenses,
        }
    }
}

impl BalanceSheet {
    pub fn from_table(table: &TransactionTable, income: &IncomeStatement) -> Self {
        let assets = table.total_amount();
        let liabilities = income.expenses.abs();
        Self {
            assets,
            liabilities,
            equity: assets - liabilities,
        }
    }
}

impl Ratios {
    pub fn compute(income: &IncomeStatement, balance: &BalanceSheet) -> Self {
        Self {
            net_profit_margin_pct: ratio(income.net_profit, income.revenue) * 100.0,
            debt_to_equity: ratio(balance.liabilities, balance.equity),
            equity_ratio_pct: ratio(balance.equity, balance.assets) * 100.0,
        }
    }

    /// (label, value) pairs in display order
    pub fn rows(&self) -> [(&'static str, f64); 3] {
        [
            ("Net Profit Margin (%)", self.net_profit_margin_pct),
            ("Debt-to-Equity", self.debt_to_equity),
            ("Equity Ratio (%)", self.equity_ratio_pct),
        ]
    }
}

impl Valuation {
    pub fn compute(income: &IncomeStatement, multiples: &ValuationMultiples) -> Self {
        Self {
            dcf_ev: income.net_profit * multiples.dcf_multiple,
            ev_ebitda: income.net_profit * multiples.ebitda_multiple,
            revenue_multiple_ev: income.revenue * multiples.revenue_multiple,
        }
    }
}

impl FinancialSummary {
    /// Build every statement from an already categorized table.
    pub fn from_table(table: &TransactionTable, multiples: &ValuationMultiples) -> Self {
        let income_statement = IncomeStatement::from_table(table);
        let balance_sheet = BalanceSheet::from_table(table, &income_statement);
        Self {
            ratios: Ratios::compute(&income_statement, &balance_sheet),
            valuation: Valuation::compute(&income_statement, multiples),
            income_statement,
            balance_sheet,
        }
    }

    /// The nine headline metrics, in report order.
    pub fn metrics(&self) -> [(&'static str, f64); 9] {
        let i = &self.income_statement;
        let b = &self.balance_sheet;
        let v = &self.valuation;
        [
            ("Revenue", i.revenue),
            ("Expenses", i.expenses),
            ("Net Profit", i.net_profit),
            ("Assets", b.assets),
            ("Liabilities", b.liabilities),
            ("Equity", b.equity),
            ("DCF EV", v.dcf_ev),
            ("EV/EBITDA EV", v.ev_ebitda),
            ("Revenue Multiple EV", v.revenue_multiple_ev),
        ]
    }
}
