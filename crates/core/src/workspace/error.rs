//! Error types for the workspace module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while managing scratch directories.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// No free directory name was found.
    #[error("Could not create a scratch directory for {job_id} after {attempts} attempts")]
    Exhausted { job_id: String, attempts: u32 },

    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkspaceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
