//! Process execution failures.

use std::path::Path;
use thiserror::Error;

/// The encoder process could not be spawned or exited unsuccessfully.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ExecutionFailure {
    /// Exit code; `None` when the process never ran or was killed by a signal.
    pub code: Option<i32>,
    /// Short diagnostic.
    pub message: String,
    /// Captured error output of the encoder, if any.
    pub stderr: Option<String>,
}

impl ExecutionFailure {
    /// Creates a failure with an arbitrary message.
    pub fn new(code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            stderr: None,
        }
    }

    /// The binary could not be started.
    pub fn spawn_failed(binary: &Path, err: &std::io::Error) -> Self {
        let message = if err.kind() == std::io::ErrorKind::NotFound {
            format!("Encoder not found at path: {}", binary.display())
        } else {
            format!("Failed to spawn {}: {}", binary.display(), err)
        };
        Self::new(None, message)
    }

    /// The process ran and reported failure.
    pub fn exited(code: Option<i32>, stderr: impl Into<String>) -> Self {
        let stderr = stderr.into();
        let message = match code {
            Some(code) => format!("ffmpeg exited with code {}", code),
            None => "ffmpeg was terminated by a signal".to_string(),
        };
        Self {
            code,
            message,
            stderr: if stderr.is_empty() { None } else { Some(stderr) },
        }
    }

    /// The process did not finish in time and was killed.
    pub fn timed_out(timeout_secs: u64) -> Self {
        Self::new(
            None,
            format!("ffmpeg timed out after {} seconds", timeout_secs),
        )
    }

    /// Waiting on the process failed.
    pub fn io(err: std::io::Error) -> Self {
        Self::new(None, format!("I/O error while running ffmpeg: {}", err))
    }
}
