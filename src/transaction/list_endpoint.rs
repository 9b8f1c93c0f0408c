use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    models::{Balance, Transaction},
    stores::{TransactionStore, sqlite::SQLiteTransactionStore},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    transaction_store: SQLiteTransactionStore,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// All stored transactions and their balance.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionList {
    /// The transactions ordered by ID.
    pub transactions: Vec<Transaction>,
    /// The totals over `transactions`.
    pub balance: Balance,
}

/// A route handler that responds with all transactions and their balance.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
) -> Result<Json<TransactionList>, Error> {
    let transactions = state.transaction_store.get_all()?;
    let balance = Balance::from_transactions(&transactions);

    Ok(Json(TransactionList {
        transactions,
        balance,
    }))
}
