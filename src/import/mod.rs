//! Bulk import of transactions from CSV files.
//!
//! An import runs four stages in order, stopping at the first error:
//! 1. [csv](self::csv) reads and validates the rows of the file,
//! 2. [reconcile] finds or creates the categories the rows refer to,
//! 3. [materialize] links rows to categories and saves them as transactions,
//! 4. [cleanup] deletes the file once the transactions are saved.

mod cleanup;
mod csv;
mod endpoint;
mod materialize;
mod reconcile;
mod service;

pub use self::csv::{ParsedCsv, ParsedRow, parse_csv_file};
pub use endpoint::import_transactions_endpoint;
pub use service::{ImportOutcome, ImportTransactions};
