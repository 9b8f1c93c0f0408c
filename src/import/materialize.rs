//! Turns parsed rows into saved transactions.

use crate::{
    Error,
    import::csv::ParsedRow,
    models::{Category, Transaction, TransactionBuilder},
    stores::TransactionStore,
};

/// Link each row to its category and save all rows as one batch.
///
/// A row's category is the first category in `categories` with exactly the
/// same title. Rows without a matching category are saved without one.
///
/// Returns the saved transactions in the order of `rows`.
///
/// # Errors
/// Returns an error if the transactions cannot be saved, in which case none
/// are saved.
pub fn materialize_transactions<T>(
    rows: Vec<ParsedRow>,
    categories: &[Category],
    transaction_store: &T,
) -> Result<Vec<Transaction>, Error>
where
    T: TransactionStore,
{
    let builders: Vec<TransactionBuilder> = rows
        .into_iter()
        .map(|row| {
            let category = row.category.as_ref().and_then(|title| {
                categories
                    .iter()
                    .find(|category| &category.title == title)
                    .cloned()
            });

            Transaction::build(&row.title, row.kind, row.value).category(category)
        })
        .collect();

    let unlinked = builders
        .iter()
        .filter(|builder| builder.category.is_none())
        .count();
    tracing::debug!(
        "Saving {} transactions, {unlinked} without a category",
        builders.len()
    );

    transaction_store.create_many(builders)
}
