//! Implements the stores with a SQLite backend.
//!
//! All stores share one connection, see [AppState](crate::AppState).

mod category;
mod transaction;

pub use category::SQLiteCategoryStore;
pub use transaction::SQLiteTransactionStore;

use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::Error;

/// Acquire the lock for the shared database connection.
///
/// # Errors
/// Returns an [Error::DatabaseLockError] if the lock is poisoned.
fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
