//! Defines the category store trait.

use crate::{
    Error,
    models::{Category, CategoryTitle},
};

/// Creates and retrieves categories for transactions.
pub trait CategoryStore {
    /// Get the categories whose title is one of `titles`.
    ///
    /// Titles are matched exactly. `titles` may contain duplicates, each
    /// matching category is returned once.
    fn get_by_titles(&self, titles: &[CategoryTitle]) -> Result<Vec<Category>, Error>;

    /// Save a batch of new categories, returning them in the order of `titles`.
    ///
    /// Implementers should save the whole batch or nothing, and return the
    /// stored category instead of failing when a title already exists.
    fn create_many(&self, titles: Vec<CategoryTitle>) -> Result<Vec<Category>, Error>;

    /// Get all categories ordered by ID.
    fn get_all(&self) -> Result<Vec<Category>, Error>;
}
