//! Mock process driver for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::driver::{ExecutionFailure, ProcessDriver};
use crate::encode::Command;
use crate::progress::{ProgressEvent, ProgressListener};

/// A recorded driver invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedExecution {
    /// The command that was submitted.
    pub command: Command,
    /// Whether it was run in the background.
    pub background: bool,
    /// Whether a progress listener was attached.
    pub had_listener: bool,
}

/// Mock implementation of the ProcessDriver trait.
///
/// Never spawns anything. Every invocation is recorded, and failures can be
/// scripted per call number:
///
/// ```rust,ignore
/// use passforge_core::testing::MockDriver;
///
/// let driver = MockDriver::new();
/// driver.fail_on_call(2, ExecutionFailure::exited(Some(1), "boom")).await;
///
/// // Run a two-pass job...
///
/// assert_eq!(driver.execution_count().await, 2);
/// ```
#[derive(Debug)]
pub struct MockDriver {
    /// Recorded executions.
    executions: Arc<RwLock<Vec<RecordedExecution>>>,
    /// Failures keyed by 1-based call number.
    failures: Arc<RwLock<HashMap<usize, ExecutionFailure>>>,
    /// Events fed to the listener of every foreground call.
    progress_events: Arc<RwLock<Vec<ProgressEvent>>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Create a new mock driver where every call succeeds.
    pub fn new() -> Self {
        Self {
            executions: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            progress_events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get all recorded executions.
    pub async fn recorded_executions(&self) -> Vec<RecordedExecution> {
        self.executions.read().await.clone()
    }

    /// Get the number of executions performed.
    pub async fn execution_count(&self) -> usize {
        self.executions.read().await.len()
    }

    /// Clear recorded executions.
    pub async fn clear_recorded(&self) {
        self.executions.write().await.clear();
    }

    /// Make the `call`-th execution (1-based) fail with `failure`.
    pub async fn fail_on_call(&self, call: usize, failure: ExecutionFailure) {
        self.failures.write().await.insert(call, failure);
    }

    /// Events handed to the listener of every foreground execution.
    pub async fn set_progress_events(&self, events: Vec<ProgressEvent>) {
        *self.progress_events.write().await = events;
    }
}

#[async_trait]
impl ProcessDriver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(
        &self,
        command: &Command,
        background: bool,
        listener: Option<Box<dyn ProgressListener>>,
    ) -> Result<(), ExecutionFailure> {
        let call = {
            let mut executions = self.executions.write().await;
            executions.push(RecordedExecution {
                command: command.clone(),
                background,
                had_listener: listener.is_some(),
            });
            executions.len()
        };

        if let Some(mut listener) = listener.filter(|_| !background) {
            for event in self.progress_events.read().await.iter() {
                listener.on_progress(event);
            }
        }

        match self.failures.write().await.remove(&call) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}
