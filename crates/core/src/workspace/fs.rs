//! File system backed workspace.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::WorkspaceError;
use super::Workspace;

/// Creates scratch directories under a root directory.
///
/// Directories are tracked per job id; anything still tracked when the
/// workspace is dropped is removed on a best-effort basis.
#[derive(Debug)]
pub struct FsWorkspace {
    root: PathBuf,
    dirs: Mutex<HashMap<String, Vec<PathBuf>>>,
}

impl FsWorkspace {
    /// Creates a workspace rooted at `root`. The root is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dirs: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directories currently held for `job_id`.
    pub fn dirs_for(&self, job_id: &str) -> Vec<PathBuf> {
        self.lock_dirs().get(job_id).cloned().unwrap_or_default()
    }

    fn lock_dirs(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<PathBuf>>> {
        // A poisoned map is still consistent: entries are only inserted or removed whole.
        self.dirs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn candidate(&self, job_id: &str) -> PathBuf {
        let suffix = Uuid::new_v4().simple().to_string();
        self.root.join(format!("{}-{}", job_id, &suffix[..12]))
    }

    #[cfg(unix)]
    async fn set_permissions(path: &Path, permissions: u32) -> Result<(), WorkspaceError> {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, std::fs::Permissions::from_mode(permissions))
            .await
            .map_err(|e| WorkspaceError::io(path, e))
    }

    #[cfg(not(unix))]
    async fn set_permissions(_path: &Path, _permissions: u32) -> Result<(), WorkspaceError> {
        Ok(())
    }
}

#[async_trait]
impl Workspace for FsWorkspace {
    async fn create_scratch_dir(
        &self,
        permissions: u32,
        max_attempts: u32,
        job_id: &str,
    ) -> Result<PathBuf, WorkspaceError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| WorkspaceError::io(&self.root, e))?;

        for _ in 0..max_attempts {
            let dir = self.candidate(job_id);
            match fs::create_dir(&dir).await {
                Ok(()) => {
                    self.lock_dirs()
                        .entry(job_id.to_string())
                        .or_default()
                        .push(dir.clone());
                    Self::set_permissions(&dir, permissions).await?;
                    debug!(job_id, dir = %dir.display(), "Created scratch directory");
                    return Ok(dir);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(WorkspaceError::io(dir, e)),
            }
        }

        Err(WorkspaceError::Exhausted {
            job_id: job_id.to_string(),
            attempts: max_attempts,
        })
    }

    async fn clean(&self, job_id: &str) -> Result<(), WorkspaceError> {
        let dirs = self.lock_dirs().remove(job_id).unwrap_or_default();

        let mut first_error = None;
        for dir in dirs {
            match fs::remove_dir_all(&dir).await {
                Ok(()) => debug!(job_id, dir = %dir.display(), "Removed scratch directory"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(job_id, dir = %dir.display(), error = %e, "Failed to remove scratch directory");
                    first_error.get_or_insert(WorkspaceError::io(dir, e));
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// Best-effort only: this blocks the dropping thread and ignores errors.
// Jobs release their directories through `clean`; this only catches what a
// cancelled job left behind.
impl Drop for FsWorkspace {
    fn drop(&mut self) {
        let dirs = match self.dirs.get_mut() {
            Ok(dirs) => std::mem::take(dirs),
            Err(poisoned) => std::mem::take(poisoned.into_inner()),
        };
        for dir in dirs.into_values().flatten() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
