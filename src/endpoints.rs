//! The API endpoints URIs.

/// The route to list transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to import transactions from CSV files.
pub const IMPORT_TRANSACTIONS: &str = "/api/transactions/import";

/// Replace the parameter in `endpoint_path` with `id`, for requesting
/// endpoints that take a parameter in tests.
///
/// Expects `endpoint_path` to contain exactly one parameter wrapped in braces,
/// e.g. `{transaction_id}`. Paths without a parameter are returned unchanged.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    match (endpoint_path.find('{'), endpoint_path.find('}')) {
        (Some(start), Some(end)) if start < end => format!(
            "{}{id}{}",
            &endpoint_path[..start],
            &endpoint_path[end + 1..]
        ),
        _ => endpoint_path.to_owned(),
    }
}
