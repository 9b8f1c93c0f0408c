//! Route handlers and operations for stored transactions.

mod delete_endpoint;
mod list_endpoint;

pub use delete_endpoint::{delete_transaction, delete_transaction_endpoint};
pub use list_endpoint::list_transactions_endpoint;
