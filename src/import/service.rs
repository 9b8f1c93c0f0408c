//! Runs the import stages against injected stores.

use std::{path::Path, time::Instant};

use crate::{
    Error,
    config::CategoryResolution,
    import::{
        cleanup::remove_source_file,
        csv::{ParsedCsv, parse_csv_file},
        materialize::materialize_transactions,
        reconcile::{Reconciliation, reconcile_categories},
    },
    models::{Category, Transaction},
    stores::{CategoryStore, TransactionStore},
};

/// The result of a successful import.
#[derive(Debug, PartialEq)]
pub struct ImportOutcome {
    /// The saved transactions in file order.
    pub transactions: Vec<Transaction>,
    /// The categories created by the import.
    pub created_categories: Vec<Category>,
    /// Set if the transactions were saved but the file could not be deleted.
    pub cleanup_error: Option<Error>,
}

/// Imports transactions from CSV files into the injected stores.
#[derive(Debug, Clone)]
pub struct ImportTransactions<C, T> {
    category_store: C,
    transaction_store: T,
    category_resolution: CategoryResolution,
}

impl<C, T> ImportTransactions<C, T>
where
    C: CategoryStore,
    T: TransactionStore,
{
    /// Create an importer that saves categories to `category_store` and
    /// transactions to `transaction_store`.
    pub fn new(
        category_store: C,
        transaction_store: T,
        category_resolution: CategoryResolution,
    ) -> Self {
        Self {
            category_store,
            transaction_store,
            category_resolution,
        }
    }

    /// Import the transactions in the CSV file at `path`, then delete the file.
    ///
    /// The file is only deleted once the transactions have been saved. If it
    /// cannot be deleted the import still succeeds and the error is returned
    /// in [ImportOutcome::cleanup_error].
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if the
    /// categories or transactions cannot be saved. The file is kept so the
    /// import can be retried.
    ///
    /// Categories saved before a failure to save the transactions are not
    /// rolled back, a retry reuses them.
    pub fn execute(&self, path: &Path) -> Result<ImportOutcome, Error> {
        self.execute_all(&[path])
    }

    /// Import the transactions in every CSV file in `paths` as one batch,
    /// then delete the files.
    ///
    /// Every file is parsed before anything is saved, and the rows of all
    /// files are saved in a single SQL transaction, so either all files are
    /// imported or none are. Rows keep the order of `paths`.
    ///
    /// If more than one file cannot be deleted, [ImportOutcome::cleanup_error]
    /// holds the first failure and the rest are logged.
    ///
    /// # Errors
    /// Same as [ImportTransactions::execute]. All files are kept on error.
    pub fn execute_all<P>(&self, paths: &[P]) -> Result<ImportOutcome, Error>
    where
        P: AsRef<Path>,
    {
        let start_time = Instant::now();

        let mut rows = Vec::new();
        let mut category_titles = Vec::new();

        for path in paths {
            let ParsedCsv {
                rows: file_rows,
                category_titles: file_titles,
            } = parse_csv_file(path.as_ref())?;

            rows.extend(file_rows);
            category_titles.extend(file_titles);
        }

        let Reconciliation { created, existing } =
            reconcile_categories(&category_titles, &self.category_store)?;

        let transactions = match self.category_resolution {
            CategoryResolution::PreExistingAndCreated => {
                let categories: Vec<Category> =
                    created.iter().chain(existing.iter()).cloned().collect();
                materialize_transactions(rows, &categories, &self.transaction_store)?
            }
            CategoryResolution::PreExistingOnly => {
                materialize_transactions(rows, &existing, &self.transaction_store)?
            }
        };

        let mut cleanup_error = None;

        for path in paths {
            if let Err(error) = remove_source_file(path.as_ref()) {
                tracing::warn!("Imported transactions but could not remove the file: {error}");
                cleanup_error.get_or_insert(error);
            }
        }

        tracing::info!(
            "Imported {} transactions and created {} categories from {} file(s) in {}ms",
            transactions.len(),
            created.len(),
            paths.len(),
            start_time.elapsed().as_millis()
        );

        Ok(ImportOutcome {
            transactions,
            created_categories: created,
            cleanup_error,
        })
    }
}
