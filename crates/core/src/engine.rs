//! Entry point wiring the real collaborators together.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::driver::{FfmpegDriver, ProcessDriver};
use crate::encode::EncodeError;
use crate::media::Video;
use crate::probe::{FfprobeProbe, Probe};
use crate::workspace::{FsWorkspace, Workspace};

/// Opens videos bound to a shared driver, probe and workspace.
#[derive(Clone)]
pub struct Engine {
    driver: Arc<dyn ProcessDriver>,
    probe: Arc<dyn Probe>,
    workspace: Arc<dyn Workspace>,
    config: Arc<Config>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("driver", &self.driver.name())
            .field("probe", &self.probe.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Engine {
    /// Builds the ffmpeg driver, ffprobe probe and filesystem workspace
    /// described by `config`.
    pub fn from_config(config: Config) -> Self {
        let driver = Arc::new(FfmpegDriver::new(config.encoder.clone()));
        let probe = Arc::new(FfprobeProbe::new(config.encoder.ffprobe_path.clone()));
        let workspace = Arc::new(FsWorkspace::new(config.workspace.temp_dir.clone()));

        info!(
            ffmpeg = %config.encoder.ffmpeg_path.display(),
            ffprobe = %config.encoder.ffprobe_path.display(),
            temp_dir = %config.workspace.temp_dir.display(),
            "Encoder engine initialized"
        );

        Self::new(config, driver, probe, workspace)
    }

    pub fn new(
        config: Config,
        driver: Arc<dyn ProcessDriver>,
        probe: Arc<dyn Probe>,
        workspace: Arc<dyn Workspace>,
    ) -> Self {
        Self {
            driver,
            probe,
            workspace,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens `path` after checking it can be probed.
    pub async fn open(&self, path: impl Into<PathBuf>) -> Result<Video, EncodeError> {
        let path = path.into();
        let info = self.probe.probe(&path).await?;
        debug!(
            path = %path.display(),
            duration_secs = info.duration_secs,
            video = info.has_video(),
            audio = info.has_audio(),
            "Opened media"
        );

        Ok(self.video(path))
    }

    /// A video for `path` without probing it.
    pub fn video(&self, path: impl Into<PathBuf>) -> Video {
        Video::new(
            path,
            Arc::clone(&self.driver),
            Arc::clone(&self.probe),
            Arc::clone(&self.workspace),
            Arc::clone(&self.config),
        )
    }
}
