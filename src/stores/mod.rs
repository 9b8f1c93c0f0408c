//! Contains traits and implementations for objects that store the domain [models](crate::models).

mod category;
mod transaction;

pub mod sqlite;

pub use category::CategoryStore;
pub use transaction::TransactionStore;
