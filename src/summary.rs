use crate::models::{Kind, Transaction};

/// Totals derived from a ledger snapshot. Always recomputed, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
}

impl Summary {
    pub fn of(transactions: &[Transaction]) -> Self {
        let total_income = total_for(transactions, Kind::Income);
        let total_expense = total_for(transactions, Kind::Expense);
        Self {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.balance < 0.0
    }
}

fn total_for(transactions: &[Transaction], kind: Kind) -> f64 {
    transactions
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.amount)
        .sum()
}
