//! Error types for scanning

use std::path::PathBuf;

use thiserror::Error;

/// Fatal scan failures. Anything that goes wrong below the root becomes an
/// error record instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Root path does not exist.
    #[error("Root path not found: {path}")]
    RootNotFound { path: PathBuf },

    /// Root path exists but is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Root directory could not be listed.
    #[error("Cannot list root directory {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while inspecting the root.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::RootNotFound { path },
            _ => Self::RootUnreadable { path, source },
        }
    }
}
