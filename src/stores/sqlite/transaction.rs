//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    database_id::{CategoryId, TransactionId},
    db::{CreateTable, MapRow},
    models::{Category, CategoryTitle, Transaction, TransactionBuilder},
    stores::{TransactionStore, sqlite::lock_connection},
};

const SELECT_TRANSACTIONS: &str = "SELECT t.id, t.title, t.type, t.value, c.id, c.title
    FROM \"transaction\" t
    LEFT JOIN category c ON c.id = t.category_id";

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction may reference a [Category], the category
/// table must be set up in the same database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Insert the transactions in a single SQL transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidCategory] if a category does not refer to a stored category,
    /// - or [Error::SqlError] if there is some other SQL error.
    ///
    /// Nothing is saved when an error is returned.
    fn create_many(&self, builders: Vec<TransactionBuilder>) -> Result<Vec<Transaction>, Error> {
        let connection = lock_connection(&self.connection)?;
        let tx = connection.unchecked_transaction()?;
        let mut transactions = Vec::with_capacity(builders.len());

        // Prepare the insert statement once for reuse
        let mut stmt = tx.prepare(
            "INSERT INTO \"transaction\" (title, type, value, category_id)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
        )?;

        for builder in builders {
            let category_id = builder.category.as_ref().map(|category| category.id);

            let id: TransactionId = stmt
                .query_row(
                    (&builder.title, builder.kind, builder.value, category_id),
                    |row| row.get(0),
                )
                .map_err(|error| match (error, category_id) {
                    (
                        rusqlite::Error::SqliteFailure(
                            rusqlite::ffi::Error {
                                code: _,
                                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                            },
                            _,
                        ),
                        Some(category_id),
                    ) => Error::InvalidCategory(category_id),
                    (error, _) => error.into(),
                })?;

            transactions.push(Transaction {
                id,
                title: builder.title,
                kind: builder.kind,
                value: builder.value,
                category: builder.category,
            });
        }

        drop(stmt);

        tx.commit()?;
        Ok(transactions)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] there is some other SQL error.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        let transaction = lock_connection(&self.connection)?
            .prepare(&format!("{SELECT_TRANSACTIONS} WHERE t.id = :id"))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(transaction)
    }

    /// Retrieve all transactions in the database.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_all(&self) -> Result<Vec<Transaction>, Error> {
        lock_connection(&self.connection)?
            .prepare(&format!("{SELECT_TRANSACTIONS} ORDER BY t.id ASC"))?
            .query_map([], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
            .collect()
    }

    /// Delete `transaction` from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the transaction is not in the database,
    /// - or [Error::SqlError] there is some other SQL error.
    fn remove(&self, transaction: Transaction) -> Result<(), Error> {
        let rows_affected = lock_connection(&self.connection)?.execute(
            "DELETE FROM \"transaction\" WHERE id = :id",
            &[(":id", &transaction.id)],
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'outcome')),
                value REAL NOT NULL,
                category_id INTEGER,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let title = row.get(offset + 1)?;
        let kind = row.get(offset + 2)?;
        let value = row.get(offset + 3)?;

        let category_id: Option<CategoryId> = row.get(offset + 4)?;
        let category = match category_id {
            Some(id) => {
                let raw_title: String = row.get(offset + 5)?;
                Some(Category {
                    id,
                    title: CategoryTitle::new_unchecked(&raw_title),
                })
            }
            None => None,
        };

        Ok(Transaction {
            id,
            title,
            kind,
            value,
            category,
        })
    }
}
