//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    config::ImportConfig,
    db::initialize,
    stores::sqlite::{SQLiteCategoryStore, SQLiteTransactionStore},
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The store for [categories](crate::Category).
    pub category_store: SQLiteCategoryStore,

    /// The store for [transactions](crate::Transaction).
    pub transaction_store: SQLiteTransactionStore,

    /// The config that controls how CSV files are imported.
    pub import_config: ImportConfig,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// Both stores share the one connection.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, import_config: ImportConfig) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            category_store: SQLiteCategoryStore::new(connection.clone()),
            transaction_store: SQLiteTransactionStore::new(connection),
            import_config,
        })
    }
}
