//! Error types for encode jobs.

use thiserror::Error;

use crate::driver::ExecutionFailure;
use crate::probe::ProbeError;
use crate::workspace::WorkspaceError;

/// Errors surfaced by an encode job.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The job was misconfigured; nothing was allocated or spawned.
    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    /// A pass failed; later passes were not started.
    #[error("Encoding failed on pass {pass}/{total}: {message}")]
    Encoding {
        pass: u32,
        total: u32,
        code: Option<i32>,
        message: String,
        #[source]
        source: ExecutionFailure,
    },

    /// Frame extraction failed.
    #[error("Frame extraction at {timecode} failed: {source}")]
    Frame {
        timecode: String,
        #[source]
        source: ExecutionFailure,
    },

    /// Scratch directory could not be allocated or released.
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// The source could not be probed.
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),
}

impl EncodeError {
    /// Creates a configuration error.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Wraps the failure of pass `pass` out of `total`.
    pub fn encoding_failed(pass: u32, total: u32, failure: ExecutionFailure) -> Self {
        Self::Encoding {
            pass,
            total,
            code: failure.code,
            message: failure.message.clone(),
            source: failure,
        }
    }

    /// Exit code of the failed process, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Encoding { code, .. } => *code,
            Self::Frame { source, .. } => source.code,
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
