//! Read-only media probing.
//!
//! The orchestrator only asks a [`Probe`] for stream information, e.g. the
//! source duration used to scale progress reports.

mod error;
mod ffprobe;
mod types;

pub use error::ProbeError;
pub use ffprobe::FfprobeProbe;
pub use types::MediaInfo;

use async_trait::async_trait;
use std::path::Path;

/// Reads metadata of media files.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Returns the name of this probe implementation.
    fn name(&self) -> &str;

    /// Probes a media file to get its information.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError>;
}
