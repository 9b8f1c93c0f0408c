//! Defines the transaction store trait.

use crate::{
    Error,
    database_id::TransactionId,
    models::{Transaction, TransactionBuilder},
};

/// Handles the creation, retrieval and removal of transactions.
pub trait TransactionStore {
    /// Save a batch of transactions, returning them in the order of `builders`.
    ///
    /// Implementers should save the whole batch or nothing.
    fn create_many(&self, builders: Vec<TransactionBuilder>) -> Result<Vec<Transaction>, Error>;

    /// Retrieve a transaction from the store.
    ///
    /// Returns [Error::NotFound] if `id` does not refer to a stored transaction.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve all transactions ordered by ID.
    fn get_all(&self) -> Result<Vec<Transaction>, Error>;

    /// Remove `transaction` from the store.
    ///
    /// Returns [Error::NotFound] if the transaction is not in the store.
    fn remove(&self, transaction: Transaction) -> Result<(), Error>;
}
