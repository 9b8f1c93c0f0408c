//! This module defines the domain data types.

mod balance;
mod category;
mod transaction;

pub use balance::Balance;
pub use category::{Category, CategoryTitle};
pub use transaction::{Transaction, TransactionBuilder, TransactionType};
