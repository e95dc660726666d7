//! Error types for the probe module.

use std::path::PathBuf;
use thiserror::Error;

/// Why a media file could not be probed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("ffprobe not found at path: {}", path.display())]
    BinaryNotFound { path: PathBuf },

    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// ffprobe exited unsuccessfully, usually because the file is not media.
    #[error("ffprobe rejected the file: {reason}")]
    Failed { reason: String },

    #[error("Unexpected ffprobe output: {reason}")]
    InvalidOutput { reason: String },

    #[error("I/O error while running ffprobe: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}
