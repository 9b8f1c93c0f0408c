//! This file defines the `Category` type and the title used to look categories up.
//! A category acts like a label for a transaction, a transaction may only have one category.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId};

/// A validated, trimmed, non-empty category title.
///
/// Titles are compared as exact strings, so "Food" and "food" are different
/// categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryTitle(String);

impl CategoryTitle {
    /// Create a category title, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryTitle] if `title` is
    /// empty or only whitespace.
    pub fn new(title: &str) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            Err(Error::EmptyCategoryTitle)
        } else {
            Ok(Self(title.to_owned()))
        }
    }

    /// Create a category title without validation.
    ///
    /// The caller should ensure that the string is trimmed and not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(title: &str) -> Self {
        Self(title.to_owned())
    }
}

impl AsRef<str> for CategoryTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryTitle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryTitle::new(s)
    }
}

impl Display for CategoryTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category for grouping transactions (e.g., 'Groceries', 'Salary').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The unique title of the category.
    pub title: CategoryTitle,
}
