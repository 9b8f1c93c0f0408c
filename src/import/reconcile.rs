//! Matches the category titles of imported rows against the stored categories.

use std::collections::HashSet;

use crate::{
    Error,
    models::{Category, CategoryTitle},
    stores::CategoryStore,
};

/// The categories referenced by an import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// The categories created for titles that were not stored yet, in order
    /// of first appearance.
    pub created: Vec<Category>,
    /// The stored categories whose title appeared in the import.
    pub existing: Vec<Category>,
}

/// Find the stored categories for `titles` and create the missing ones.
///
/// Titles are matched exactly and each missing title is created once, no
/// matter how many rows use it. The new categories are saved as one batch.
///
/// # Errors
/// Returns an error if the categories cannot be read or saved.
pub fn reconcile_categories<C>(
    titles: &[CategoryTitle],
    category_store: &C,
) -> Result<Reconciliation, Error>
where
    C: CategoryStore,
{
    if titles.is_empty() {
        return Ok(Reconciliation::default());
    }

    let existing = category_store.get_by_titles(titles)?;
    let existing_titles: HashSet<&CategoryTitle> =
        existing.iter().map(|category| &category.title).collect();

    let mut seen = HashSet::new();
    let new_titles: Vec<CategoryTitle> = titles
        .iter()
        .filter(|title| !existing_titles.contains(title))
        .filter(|title| seen.insert(*title))
        .cloned()
        .collect();

    tracing::debug!(
        "Found {} existing categories, creating {} new categories",
        existing.len(),
        new_titles.len()
    );

    let created = category_store.create_many(new_titles)?;

    Ok(Reconciliation { created, existing })
}
