//! Removes imported files from disk.

use std::path::Path;

use crate::Error;

/// Delete the file at `path`.
///
/// # Errors
/// Returns an [Error::DeleteFile] if the file cannot be deleted, e.g. it does
/// not exist or the process lacks permission.
pub fn remove_source_file(path: &Path) -> Result<(), Error> {
    std::fs::remove_file(path)
        .map_err(|error| Error::DeleteFile(format!("{}: {error}", path.display())))
}
