//! Defines the summary of money earned and spent.

use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

/// The totals of income and outcome over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// The sum of all income transactions.
    pub income: f64,
    /// The sum of all outcome transactions.
    pub outcome: f64,
    /// `income - outcome`.
    pub total: f64,
}

impl Balance {
    /// Sum up the values of `transactions` by their type.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let (income, outcome) =
            transactions
                .iter()
                .fold((0.0, 0.0), |(income, outcome), transaction| {
                    match transaction.kind {
                        TransactionType::Income => (income + transaction.value, outcome),
                        TransactionType::Outcome => (income, outcome + transaction.value),
                    }
                });

        Self {
            income,
            outcome,
            total: income - outcome,
        }
    }
}
