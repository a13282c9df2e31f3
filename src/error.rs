use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Per-record failures. None of these stop the run on their own; the loop
/// records the failure and moves on (see `OnAccessDenied` for the exception).
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("failed to download {url}: {source}")]
    DownloadFailed { url: String, #[source] source: BoxError },

    #[error("failed to read response body from {url}: {source}")]
    ReadFailed { url: String, #[source] source: BoxError },

    #[error("could not determine a file extension for {url}")]
    ExtensionUnresolvable { url: String },

    #[error("remote returned an HTML page ({detail}) instead of a file for {url}")]
    AccessDenied { url: String, detail: String },

    #[error("failed to create directory {}: {source}", dir.display())]
    CreateDirFailed { dir: PathBuf, #[source] source: std::io::Error },

    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, #[source] source: std::io::Error },

    #[error("file saved but updating record {id} failed: {source}")]
    UpdateFailed { id: i64, #[source] source: BoxError },
}

impl MigrateError {
    /// Stable tag written to the report's `reason` field.
    pub fn kind(&self) -> &'static str {
        match self {
            MigrateError::DownloadFailed { .. } => "download_failed",
            MigrateError::ReadFailed { .. } => "read_failed",
            MigrateError::ExtensionUnresolvable { .. } => "extension_unresolvable",
            MigrateError::AccessDenied { .. } => "access_denied",
            MigrateError::CreateDirFailed { .. } => "create_dir_failed",
            MigrateError::WriteFailed { .. } => "write_failed",
            MigrateError::UpdateFailed { .. } => "update_failed",
        }
    }
}
