//! Implements a SQLite backed category store.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Row, params_from_iter};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Category, CategoryTitle},
    stores::{CategoryStore, sqlite::lock_connection},
};

/// The most titles bound to a single `IN (...)` query.
///
/// Stays well below SQLite's limit on the number of bound parameters.
const MAX_TITLES_PER_QUERY: usize = 500;

/// Creates and retrieves transaction categories to/from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CategoryStore for SQLiteCategoryStore {
    /// Retrieve the categories whose title is in `titles`.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_by_titles(&self, titles: &[CategoryTitle]) -> Result<Vec<Category>, Error> {
        let mut seen = HashSet::new();
        let unique_titles: Vec<&str> = titles
            .iter()
            .map(|title| title.as_ref())
            .filter(|title| seen.insert(*title))
            .collect();

        let connection = lock_connection(&self.connection)?;
        let mut categories = Vec::new();

        for chunk in unique_titles.chunks(MAX_TITLES_PER_QUERY) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let query = format!("SELECT id, title FROM category WHERE title IN ({placeholders});");

            let found = connection
                .prepare(&query)?
                .query_map(params_from_iter(chunk.iter()), Self::map_row)?
                .collect::<Result<Vec<_>, _>>()?;

            categories.extend(found);
        }

        categories.sort_by_key(|category| category.id);

        Ok(categories)
    }

    /// Insert `titles` in a single SQL transaction.
    ///
    /// A title that already exists returns the stored category, so importing
    /// the same titles twice never raises a uniqueness error.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error, in which
    /// case none of the categories are saved.
    fn create_many(&self, titles: Vec<CategoryTitle>) -> Result<Vec<Category>, Error> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let connection = lock_connection(&self.connection)?;
        let tx = connection.unchecked_transaction()?;
        let mut categories = Vec::with_capacity(titles.len());

        let mut stmt = tx.prepare(
            "INSERT INTO category (title) VALUES (?1)
             ON CONFLICT(title) DO UPDATE SET title = excluded.title
             RETURNING id, title",
        )?;

        for title in titles {
            let category = stmt.query_row((title.as_ref(),), Self::map_row)?;
            categories.push(category);
        }

        drop(stmt);

        tx.commit()?;
        Ok(categories)
    }

    /// Retrieve all categories in the database.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_all(&self) -> Result<Vec<Category>, Error> {
        lock_connection(&self.connection)?
            .prepare("SELECT id, title FROM category ORDER BY id ASC;")?
            .query_map([], Self::map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }
}

impl CreateTable for SQLiteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL UNIQUE
            );",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;

        let raw_title: String = row.get(offset + 1)?;
        let title = CategoryTitle::new_unchecked(&raw_title);

        Ok(Self::ReturnType { id, title })
    }
}
