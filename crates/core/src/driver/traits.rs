//! Trait definitions for the driver module.

use async_trait::async_trait;

use super::error::ExecutionFailure;
use crate::encode::Command;
use crate::progress::ProgressListener;

/// Runs encoder invocations.
#[async_trait]
pub trait ProcessDriver: Send + Sync {
    /// Returns the name of this driver implementation.
    fn name(&self) -> &str;

    /// Runs one encoder invocation.
    ///
    /// With `background == false` the future resolves once the process has
    /// exited, and every progress event has been handed to `listener` by then.
    /// With `background == true` the future resolves once the process has
    /// been spawned and no listener is attached.
    async fn execute(
        &self,
        command: &Command,
        background: bool,
        listener: Option<Box<dyn ProgressListener>>,
    ) -> Result<(), ExecutionFailure>;
}
