//! Settings that control how CSV files are imported.

use std::path::PathBuf;

/// Which categories an imported row may be linked to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CategoryResolution {
    /// Link rows to categories that existed before the import and to the
    /// categories created by the import.
    #[default]
    PreExistingAndCreated,
    /// Link rows only to categories that existed before the import.
    ///
    /// Rows whose category is created by the same import are saved without a
    /// category. Kept for compatibility with data imported by older versions.
    PreExistingOnly,
}

/// The configuration for the import endpoint.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// The directory uploaded CSV files are written to before they are
    /// imported. Files are deleted once their transactions are saved.
    pub upload_dir: PathBuf,
    /// Which categories imported rows may be linked to.
    pub category_resolution: CategoryResolution,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            upload_dir: std::env::temp_dir(),
            category_resolution: CategoryResolution::default(),
        }
    }
}
