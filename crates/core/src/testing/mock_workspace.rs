//! Mock workspace for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::workspace::{Workspace, WorkspaceError};

/// A recorded scratch directory request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedScratchDir {
    pub job_id: String,
    pub permissions: u32,
    pub max_attempts: u32,
}

/// Mock implementation of the Workspace trait.
///
/// Hands out paths under a fixed root without touching the filesystem.
#[derive(Debug)]
pub struct MockWorkspace {
    root: PathBuf,
    /// Recorded creation requests.
    creates: Arc<RwLock<Vec<RecordedScratchDir>>>,
    /// Job ids passed to `clean`, in call order.
    cleans: Arc<RwLock<Vec<String>>>,
    fail_create: Arc<RwLock<bool>>,
    fail_clean: Arc<RwLock<bool>>,
}

impl Default for MockWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWorkspace {
    /// Create a new mock workspace rooted at `/tmp/passforge-mock`.
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/tmp/passforge-mock"),
            creates: Arc::new(RwLock::new(Vec::new())),
            cleans: Arc::new(RwLock::new(Vec::new())),
            fail_create: Arc::new(RwLock::new(false)),
            fail_clean: Arc::new(RwLock::new(false)),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Get all recorded creation requests.
    pub async fn create_calls(&self) -> Vec<RecordedScratchDir> {
        self.creates.read().await.clone()
    }

    /// Get the job ids passed to `clean`.
    pub async fn clean_calls(&self) -> Vec<String> {
        self.cleans.read().await.clone()
    }

    /// Make every `create_scratch_dir` call fail.
    pub async fn set_create_error(&self, fail: bool) {
        *self.fail_create.write().await = fail;
    }

    /// Make every `clean` call fail.
    pub async fn set_clean_error(&self, fail: bool) {
        *self.fail_clean.write().await = fail;
    }
}

#[async_trait]
impl Workspace for MockWorkspace {
    async fn create_scratch_dir(
        &self,
        permissions: u32,
        max_attempts: u32,
        job_id: &str,
    ) -> Result<PathBuf, WorkspaceError> {
        self.creates.write().await.push(RecordedScratchDir {
            job_id: job_id.to_string(),
            permissions,
            max_attempts,
        });

        if *self.fail_create.read().await {
            return Err(WorkspaceError::Exhausted {
                job_id: job_id.to_string(),
                attempts: max_attempts,
            });
        }

        Ok(self.root.join(job_id))
    }

    async fn clean(&self, job_id: &str) -> Result<(), WorkspaceError> {
        self.cleans.write().await.push(job_id.to_string());

        if *self.fail_clean.read().await {
            return Err(WorkspaceError::io(
                self.root.join(job_id),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "mock clean failure"),
            ));
        }

        Ok(())
    }
}
