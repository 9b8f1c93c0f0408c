use std::{
    io::Write,
    path::{Path, PathBuf},
};

use axum::{
    Json,
    extract::{FromRef, Multipart, State, multipart::Field},
    http::{HeaderMap, HeaderValue, StatusCode},
};

use crate::{
    AppState, Error,
    config::ImportConfig,
    import::{ImportTransactions, cleanup::remove_source_file},
    models::Transaction,
    stores::sqlite::{SQLiteCategoryStore, SQLiteTransactionStore},
};

/// The state needed for importing transactions.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The store categories are matched against and created in.
    pub category_store: SQLiteCategoryStore,
    /// The store imported transactions are saved to.
    pub transaction_store: SQLiteTransactionStore,
    /// Where uploads are written and how categories are linked.
    pub config: ImportConfig,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            category_store: state.category_store.clone(),
            transaction_store: state.transaction_store.clone(),
            config: state.import_config.clone(),
        }
    }
}

/// The response header that carries the error if an upload could not be
/// deleted after its transactions were saved.
pub const CLEANUP_ERROR_HEADER: &str = "x-cleanup-error";

/// Route handler for importing transactions from uploaded CSV files.
///
/// Every file in the multipart form is written to the upload directory before
/// any of them is imported. The files are then imported as one batch in the
/// order they were sent, so a request either saves the rows of every file or
/// saves nothing. Uploads are deleted whether or not the import succeeds.
///
/// Responds with the created transactions. If an upload could not be deleted
/// after the import, the error is reported in the [CLEANUP_ERROR_HEADER]
/// header.
pub async fn import_transactions_endpoint(
    State(state): State<ImportState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, HeaderMap, Json<Vec<Transaction>>), Error> {
    let mut uploads = Vec::new();

    if let Err(error) =
        receive_uploads(&mut multipart, &state.config.upload_dir, &mut uploads).await
    {
        remove_uploads(&uploads);
        return Err(error);
    }

    if uploads.is_empty() {
        return Err(Error::MultipartError(
            "the form did not contain a file".to_owned(),
        ));
    }

    let importer = ImportTransactions::new(
        state.category_store,
        state.transaction_store,
        state.config.category_resolution,
    );

    let outcome = importer.execute_all(&uploads).inspect_err(|error| {
        tracing::debug!("Failed to import {} file(s): {error}", uploads.len());
        remove_uploads(&uploads);
    })?;

    Ok((
        StatusCode::CREATED,
        cleanup_error_headers(outcome.cleanup_error.as_ref()),
        Json(outcome.transactions),
    ))
}

/// Write every file field in `multipart` to `upload_dir`, appending the paths
/// to `uploads` as they are written.
async fn receive_uploads(
    multipart: &mut Multipart,
    upload_dir: &Path,
    uploads: &mut Vec<PathBuf>,
) -> Result<(), Error> {
    while let Some(field) = multipart.next_field().await.map_err(|error| {
        tracing::error!("Could not read multipart form field: {error}");
        Error::MultipartError(error.body_text())
    })? {
        if field.file_name().is_none() {
            tracing::debug!("Skipping multipart field {:?} without a file", field.name());
            continue;
        }

        uploads.push(save_upload(field, upload_dir).await?);
    }

    Ok(())
}

fn remove_uploads(uploads: &[PathBuf]) {
    for path in uploads {
        if let Err(error) = remove_source_file(path) {
            tracing::warn!("Could not remove upload after a failed import: {error}");
        }
    }
}

fn cleanup_error_headers(cleanup_error: Option<&Error>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(error) = cleanup_error {
        let value = HeaderValue::from_str(&error.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("could not delete the uploaded file"));
        headers.insert(CLEANUP_ERROR_HEADER, value);
    }

    headers
}

async fn save_upload(field: Field<'_>, upload_dir: &Path) -> Result<PathBuf, Error> {
    let is_csv = field.content_type() == Some("text/csv")
        || field
            .file_name()
            .is_some_and(|file_name| file_name.to_lowercase().ends_with(".csv"));

    if !is_csv {
        return Err(Error::NotCSV);
    }

    let file_name = field.file_name().unwrap_or_default().to_owned();
    let data = field.bytes().await.map_err(|error| {
        tracing::error!("Could not read data from multipart form field: {error}");
        Error::MultipartError("could not read data from multipart form field".to_owned())
    })?;

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    write_upload(&data, upload_dir)
}

/// Write `data` to a new, uniquely named file in `upload_dir`.
///
/// The file is not deleted when it goes out of scope, the import deletes it
/// once the transactions are saved.
fn write_upload(data: &[u8], upload_dir: &Path) -> Result<PathBuf, Error> {
    let to_error = |error: std::io::Error| {
        tracing::error!(
            "Could not write upload to {}: {error}",
            upload_dir.display()
        );
        Error::WriteUpload(error.to_string())
    };

    let mut file = tempfile::Builder::new()
        .prefix("import-")
        .suffix(".csv")
        .tempfile_in(upload_dir)
        .map_err(to_error)?;

    file.write_all(data).map_err(to_error)?;

    file.into_temp_path()
        .keep()
        .map_err(|error| to_error(error.error))
}

#[cfg(test)]
mod import_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body,
        extract::{FromRequest, Multipart, State},
        http::{Request, StatusCode},
        response::{IntoResponse, Response},
    };
    use rusqlite::Connection;
    use tempfile::{TempDir, tempdir};

    use crate::{
        Error,
        config::{CategoryResolution, ImportConfig},
        db::initialize,
        endpoints,
        import::endpoint::{
            CLEANUP_ERROR_HEADER, ImportState, cleanup_error_headers,
            import_transactions_endpoint,
        },
        models::Transaction,
        stores::{
            CategoryStore, TransactionStore,
            sqlite::{SQLiteCategoryStore, SQLiteTransactionStore},
        },
    };

    const SALARY_AND_RENT_CSV: &str = "title,type,value,category\n\
        Salary,income,5000,Job\n\
        Rent,outcome,1200,Housing";

    const FOOD_CSV: &str = "title,type,value,category\n\
        Burger,outcome,20,Food\n\
        Salary,income,5000,Job";

    fn get_test_state() -> (ImportState, TempDir) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));
        let upload_dir = tempdir().unwrap();

        let state = ImportState {
            category_store: SQLiteCategoryStore::new(connection.clone()),
            transaction_store: SQLiteTransactionStore::new(connection),
            config: ImportConfig {
                upload_dir: upload_dir.path().to_owned(),
                category_resolution: CategoryResolution::PreExistingAndCreated,
            },
        };

        (state, upload_dir)
    }

    async fn must_make_multipart(files: &[(&str, &str, &str)]) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";
        let boundary_start = format!("--{boundary}");
        let boundary_end = format!("--{boundary}--");

        let mut lines: Vec<String> = Vec::new();

        for (file_name, content_type, content) in files {
            lines.push(boundary_start.clone());
            lines.push(format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\""
            ));
            lines.push(format!("Content-Type: {content_type}"));
            lines.push(String::new());
            lines.push(content.to_string());
        }

        lines.push(boundary_end);

        let data = lines.join("\r\n").into_bytes();

        let request = Request::builder()
            .method("POST")
            .uri(endpoints::IMPORT_TRANSACTIONS)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(data.into())
            .unwrap();

        Multipart::from_request(request, &{}).await.unwrap()
    }

    async fn parse_transactions(response: Response) -> Vec<Transaction> {
        let body = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");

        serde_json::from_slice(&body).expect("Could not parse response body as transactions")
    }

    fn upload_dir_is_empty(upload_dir: &TempDir) -> bool {
        std::fs::read_dir(upload_dir.path()).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn import_csv_responds_with_created_transactions() {
        let (state, upload_dir) = get_test_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            must_make_multipart(&[("bank.csv", "text/csv", SALARY_AND_RENT_CSV)]).await,
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let transactions = parse_transactions(response).await;
        assert_eq!(transactions, state.transaction_store.get_all().unwrap());
        let categories: Vec<Option<String>> = transactions
            .iter()
            .map(|transaction| {
                transaction
                    .category
                    .as_ref()
                    .map(|category| category.title.to_string())
            })
            .collect();
        assert_eq!(
            categories,
            [Some("Job".to_owned()), Some("Housing".to_owned())]
        );
        assert!(upload_dir_is_empty(&upload_dir), "want upload to be deleted");
    }

    #[tokio::test]
    async fn import_multiple_files_shares_categories() {
        let (state, _upload_dir) = get_test_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            must_make_multipart(&[
                ("first.csv", "text/csv", SALARY_AND_RENT_CSV),
                ("second.CSV", "application/octet-stream", FOOD_CSV),
            ])
            .await,
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(parse_transactions(response).await.len(), 4);
        assert_eq!(state.category_store.get_all().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn rejects_files_that_are_not_csv() {
        let (state, upload_dir) = get_test_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            must_make_multipart(&[("notes.txt", "text/plain", "hello")]).await,
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.transaction_store.get_all().unwrap().is_empty());
        assert!(upload_dir_is_empty(&upload_dir));
    }

    #[tokio::test]
    async fn invalid_rows_are_a_bad_request_and_save_nothing() {
        let (state, _upload_dir) = get_test_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            must_make_multipart(&[(
                "bank.csv",
                "text/csv",
                "title,type,value,category\nSalary,wages,5000,Job",
            )])
            .await,
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.transaction_store.get_all().unwrap().is_empty());
        assert!(state.category_store.get_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_later_file_saves_nothing_from_earlier_files() {
        let (state, upload_dir) = get_test_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            must_make_multipart(&[
                ("first.csv", "text/csv", SALARY_AND_RENT_CSV),
                (
                    "second.csv",
                    "text/csv",
                    "title,type,value,category\nSalary,wages,5000,Job",
                ),
            ])
            .await,
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.transaction_store.get_all().unwrap().is_empty());
        assert!(state.category_store.get_all().unwrap().is_empty());
        assert!(upload_dir_is_empty(&upload_dir), "want uploads to be deleted");
    }

    #[tokio::test]
    async fn later_file_that_is_not_csv_saves_nothing() {
        let (state, upload_dir) = get_test_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            must_make_multipart(&[
                ("first.csv", "text/csv", SALARY_AND_RENT_CSV),
                ("notes.txt", "text/plain", "hello"),
            ])
            .await,
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.transaction_store.get_all().unwrap().is_empty());
        assert!(upload_dir_is_empty(&upload_dir), "want uploads to be deleted");
    }

    #[tokio::test]
    async fn successful_import_has_no_cleanup_error_header() {
        let (state, _upload_dir) = get_test_state();

        let response = import_transactions_endpoint(
            State(state),
            must_make_multipart(&[("bank.csv", "text/csv", SALARY_AND_RENT_CSV)]).await,
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get(CLEANUP_ERROR_HEADER).is_none());
    }

    #[test]
    fn cleanup_error_is_reported_in_header() {
        let error = Error::DeleteFile("uploads/import-1.csv: permission denied".to_owned());

        let headers = cleanup_error_headers(Some(&error));

        assert_eq!(
            headers.get(CLEANUP_ERROR_HEADER).unwrap(),
            "could not delete the file: uploads/import-1.csv: permission denied"
        );
    }

    #[test]
    fn cleanup_error_that_is_not_a_valid_header_gets_generic_message() {
        let error = Error::DeleteFile("uploads/import-1.csv\n: permission denied".to_owned());

        let headers = cleanup_error_headers(Some(&error));

        assert_eq!(
            headers.get(CLEANUP_ERROR_HEADER).unwrap(),
            "could not delete the uploaded file"
        );
    }

    #[tokio::test]
    async fn form_without_file_is_a_bad_request() {
        let (state, _upload_dir) = get_test_state();

        let response = import_transactions_endpoint(State(state), must_make_multipart(&[]).await)
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
