use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    stores::{TransactionStore, sqlite::SQLiteTransactionStore},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The store for managing transactions.
    transaction_store: SQLiteTransactionStore,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// Responds with 204 No Content, or 404 Not Found if the transaction does not exist.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<StatusCode, Error> {
    delete_transaction(&transaction_id, &state.transaction_store)
        .inspect_err(|error| {
            if *error != Error::DeleteMissingTransaction {
                tracing::error!("Could not delete transaction {transaction_id}: {error}");
            }
        })
        .map(|_| StatusCode::NO_CONTENT)
}

/// Delete the transaction identified by `id`.
///
/// Categories are left untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a stored
///   transaction, in which case nothing is changed,
/// - or any other error from `transaction_store`.
pub fn delete_transaction<T>(id: &str, transaction_store: &T) -> Result<(), Error>
where
    T: TransactionStore,
{
    let missing_to_delete_error = |error: Error| match error {
        Error::NotFound => Error::DeleteMissingTransaction,
        error => error,
    };

    let id: TransactionId = id.parse().map_err(|_| Error::DeleteMissingTransaction)?;
    let transaction = transaction_store.get(id).map_err(missing_to_delete_error)?;

    transaction_store
        .remove(transaction)
        .map_err(missing_to_delete_error)
}
