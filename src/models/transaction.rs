//! Defines the transaction model and the builder used to create transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{database_id::TransactionId, models::Category};

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money was earned, e.g. a salary payment.
    Income,
    /// Money was spent, e.g. rent.
    Outcome,
}

impl TransactionType {
    /// The text used for the type in CSV files, JSON and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Outcome => "outcome",
        }
    }
}

/// The text could not be parsed as a [TransactionType].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown transaction type \"{0}\"")]
pub struct UnknownTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    /// Parse a transaction type, the match is exact and case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "outcome" => Ok(TransactionType::Outcome),
            other => Err(UnknownTransactionType(other.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An income or outcome, i.e. an event where money was either earned or spent.
///
/// To create a new `Transaction`, use [Transaction::build] and save the
/// builder with a [TransactionStore](crate::stores::TransactionStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub title: String,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The amount of money earned or spent, always interpreted through `kind`.
    pub value: f64,
    /// The category the transaction belongs to, if any.
    pub category: Option<Category>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(title: &str, kind: TransactionType, value: f64) -> TransactionBuilder {
        TransactionBuilder {
            title: title.to_owned(),
            kind,
            value,
            category: None,
        }
    }
}

/// A transaction that has not been saved yet.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// A text description of what the transaction was for.
    pub title: String,

    /// Whether the money was earned or spent.
    pub kind: TransactionType,

    /// The amount of money earned or spent.
    pub value: f64,

    /// The category of the transaction, e.g. "Groceries", "Salary", "Rent".
    ///
    /// The category must already exist in storage when the transaction is
    /// saved.
    pub category: Option<Category>,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }
}
