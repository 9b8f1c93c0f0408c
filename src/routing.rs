//! Application router configuration.

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{
    AppState, endpoints,
    import::import_transactions_endpoint,
    transaction::{delete_transaction_endpoint, list_transactions_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint))
        .route(
            endpoints::IMPORT_TRANSACTIONS,
            post(import_transactions_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .with_state(state)
}
