//! Job-scoped scratch directories.
//!
//! Multi-pass jobs keep their pass log under a scratch directory allocated
//! from a [`Workspace`]. The directory is keyed by the job id and released
//! with [`Workspace::clean`] once the job ends, whatever its outcome.

mod error;
mod fs;

pub use error::WorkspaceError;
pub use fs::FsWorkspace;

use async_trait::async_trait;
use std::path::PathBuf;

/// Provider of temporary directories.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Creates a fresh directory for `job_id`.
    ///
    /// Up to `max_attempts` candidate names are tried before giving up.
    async fn create_scratch_dir(
        &self,
        permissions: u32,
        max_attempts: u32,
        job_id: &str,
    ) -> Result<PathBuf, WorkspaceError>;

    /// Removes everything created for `job_id`.
    ///
    /// Idempotent, and safe to call when creation failed part way.
    async fn clean(&self, job_id: &str) -> Result<(), WorkspaceError>;
}
