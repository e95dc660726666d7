//! Single frame extraction.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::driver::ProcessDriver;
use crate::encode::{Command, EncodeError};
use crate::probe::Probe;

use super::timecode::TimeCode;

/// A point in a video, bound to the video's driver and probe.
#[derive(Clone)]
pub struct Frame {
    video_path: PathBuf,
    driver: Arc<dyn ProcessDriver>,
    probe: Arc<dyn Probe>,
    at: TimeCode,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("video_path", &self.video_path)
            .field("at", &self.at)
            .finish()
    }
}

impl Frame {
    pub(crate) fn new(
        video_path: PathBuf,
        driver: Arc<dyn ProcessDriver>,
        probe: Arc<dyn Probe>,
        at: TimeCode,
    ) -> Self {
        Self {
            video_path,
            driver,
            probe,
            at,
        }
    }

    pub fn timecode(&self) -> TimeCode {
        self.at
    }

    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    pub fn driver(&self) -> &Arc<dyn ProcessDriver> {
        &self.driver
    }

    pub fn probe(&self) -> &Arc<dyn Probe> {
        &self.probe
    }

    /// Command writing this frame as a single image.
    ///
    /// Seeking before `-i` is fast but keyframe-aligned; seeking after `-i`
    /// decodes up to the exact position.
    pub fn command(&self, output: &Path, accurate: bool) -> Command {
        let mut command = Command::new();
        command.push("-y");
        if accurate {
            command
                .push("-i")
                .push(self.video_path.as_path())
                .push("-ss")
                .push(self.at.to_string());
        } else {
            command
                .push("-ss")
                .push(self.at.to_string())
                .push("-i")
                .push(self.video_path.as_path());
        }
        command
            .extend(["-vframes", "1", "-f", "image2"])
            .push(output);
        command
    }

    /// Writes the frame to `output`.
    pub async fn save(
        &self,
        output: impl AsRef<Path>,
        accurate: bool,
    ) -> Result<&Self, EncodeError> {
        let output = output.as_ref();
        let command = self.command(output, accurate);
        debug!(command = %command, "Extracting frame");

        self.driver
            .execute(&command, false, None)
            .await
            .map_err(|source| EncodeError::Frame {
                timecode: self.at.to_string(),
                source,
            })?;

        info!(at = %self.at, output = %output.display(), "Frame extracted");
        Ok(self)
    }
}
