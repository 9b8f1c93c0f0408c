//! Tally is a small web service for tracking personal income and expenses.
//!
//! This library provides a JSON API for listing and deleting transactions and
//! for bulk-importing transactions from CSV files. Imported rows are
//! reconciled against the stored categories by title, creating only the
//! categories that do not exist yet.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod config;
mod database_id;
mod db;
mod endpoints;
mod import;
mod models;
mod routing;
mod stores;
mod transaction;

pub use app_state::AppState;
pub use config::{CategoryResolution, ImportConfig};
pub use database_id::{CategoryId, DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use import::{ImportOutcome, ImportTransactions, ParsedCsv, ParsedRow, parse_csv_file};
pub use models::{Balance, Category, CategoryTitle, Transaction, TransactionBuilder, TransactionType};
pub use routing::build_router;
pub use stores::{
    CategoryStore, TransactionStore,
    sqlite::{SQLiteCategoryStore, SQLiteTransactionStore},
};
pub use transaction::delete_transaction;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist.
    #[error("transaction does not exist")]
    DeleteMissingTransaction,

    /// The file to import could not be opened or read.
    #[error("could not read the file: {0}")]
    ReadFile(String),

    /// The source file could not be deleted after a successful import.
    ///
    /// The imported transactions are saved when this error occurs, so it should
    /// never be reported as a failed import.
    #[error("could not delete the file: {0}")]
    DeleteFile(String),

    /// An uploaded file could not be written to the upload directory.
    #[error("could not save the uploaded file: {0}")]
    WriteUpload(String),

    /// The CSV had issues that prevented it from being parsed.
    #[error("could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The value column of a CSV row is not a finite number.
    #[error("the value \"{value}\" on line {line} is not a valid number")]
    InvalidValue {
        /// The line in the CSV file the value was found on.
        line: u64,
        /// The offending text.
        value: String,
    },

    /// The type column of a CSV row is neither "income" nor "outcome".
    #[error("the type \"{value}\" on line {line} must be either \"income\" or \"outcome\"")]
    InvalidTransactionType {
        /// The line in the CSV file the type was found on.
        line: u64,
        /// The offending text.
        value: String,
    },

    /// A transaction referenced a category that is not in the database.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// An empty string was used to create a category title.
    #[error("category title cannot be empty")]
    EmptyCategoryTitle,

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The multipart form did not contain a CSV file.
    #[error("file is not a CSV")]
    NotCSV,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::InvalidCSV(_)
            | Error::InvalidValue { .. }
            | Error::InvalidTransactionType { .. }
            | Error::EmptyCategoryTitle
            | Error::MultipartError(_)
            | Error::NotCSV => StatusCode::BAD_REQUEST,
            Error::ReadFile(_)
            | Error::DeleteFile(_)
            | Error::InvalidCategory(_)
            | Error::WriteUpload(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (
            status_code,
            Json(ErrorBody {
                status: "error",
                message,
            }),
        )
            .into_response()
    }
}
