//! The video subject of encode jobs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::driver::ProcessDriver;
use crate::encode::{EncodeError, EncodeJob, EncodeSummary};
use crate::filter::{
    AudioResampleFilter, ClipFilter, Filter, FilterPipeline, FrameRateFilter, ResizeFilter,
};
use crate::format::Format;
use crate::probe::Probe;
use crate::workspace::Workspace;

use super::frame::Frame;
use super::timecode::TimeCode;

/// A source video with its persistent filter set.
///
/// The driver, probe and workspace are shared collaborators. Jobs started
/// from this video work on a clone of its filters.
pub struct Video {
    path: PathBuf,
    filters: FilterPipeline,
    driver: Arc<dyn ProcessDriver>,
    probe: Arc<dyn Probe>,
    workspace: Arc<dyn Workspace>,
    config: Arc<Config>,
}

impl std::fmt::Debug for Video {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Video")
            .field("path", &self.path)
            .field("filters", &self.filters)
            .field("driver", &self.driver.name())
            .field("probe", &self.probe.name())
            .finish()
    }
}

impl Video {
    pub fn new(
        path: impl Into<PathBuf>,
        driver: Arc<dyn ProcessDriver>,
        probe: Arc<dyn Probe>,
        workspace: Arc<dyn Workspace>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            path: path.into(),
            filters: FilterPipeline::new(),
            driver,
            probe,
            workspace,
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persistent filters, applied to every job started from this video.
    pub fn pipeline(&self) -> &FilterPipeline {
        &self.filters
    }

    pub fn driver(&self) -> &Arc<dyn ProcessDriver> {
        &self.driver
    }

    pub fn probe(&self) -> &Arc<dyn Probe> {
        &self.probe
    }

    pub fn workspace(&self) -> &Arc<dyn Workspace> {
        &self.workspace
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Appends a filter to the persistent filter set.
    pub fn add_filter<F: Filter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.add(filter);
        self
    }

    /// Fluent helper for the built-in video filters.
    pub fn filters(&mut self) -> VideoFilters<'_> {
        VideoFilters { video: self }
    }

    /// Encodes the video into `output`, running every pass of `format`.
    pub async fn save(
        &self,
        format: &dyn Format,
        output: impl AsRef<Path>,
    ) -> Result<&Self, EncodeError> {
        self.encode(format, output).await?;
        Ok(self)
    }

    /// Like [`Video::save`], returning the job summary.
    pub async fn encode(
        &self,
        format: &dyn Format,
        output: impl AsRef<Path>,
    ) -> Result<EncodeSummary, EncodeError> {
        let mut job = EncodeJob::new(self, format, output.as_ref());
        job.run().await
    }

    /// Encodes with the arguments of `encoder.commands` in place of the
    /// filters and the format's codec and rate arguments.
    ///
    /// `format` still supplies the pass count and progress listeners. Fails
    /// with a configuration error before anything runs when no commands are
    /// configured.
    pub async fn save_with_configured_commands(
        &self,
        format: &dyn Format,
        output: impl AsRef<Path>,
    ) -> Result<&Self, EncodeError> {
        let commands = self
            .config
            .encoder
            .commands
            .clone()
            .ok_or_else(|| EncodeError::configuration("encoder.commands is not set"))?;

        let mut job = EncodeJob::with_arguments(self, format, output.as_ref(), commands);
        job.run().await?;
        Ok(self)
    }

    /// A frame handle at `at`, sharing this video's driver and probe.
    pub fn frame(&self, at: TimeCode) -> Frame {
        Frame::new(
            self.path.clone(),
            Arc::clone(&self.driver),
            Arc::clone(&self.probe),
            at,
        )
    }
}

/// Appends built-in filters to a [`Video`].
pub struct VideoFilters<'a> {
    video: &'a mut Video,
}

impl VideoFilters<'_> {
    pub fn resize(self, width: u32, height: u32) -> Self {
        self.video.add_filter(ResizeFilter::new(width, height));
        self
    }

    pub fn frame_rate(self, fps: f64, gop: Option<u32>) -> Self {
        let filter = match gop {
            Some(gop) => FrameRateFilter::new(fps).with_gop(gop),
            None => FrameRateFilter::new(fps),
        };
        self.video.add_filter(filter);
        self
    }

    pub fn clip(self, start: TimeCode, duration: Option<TimeCode>) -> Self {
        self.video.add_filter(ClipFilter::new(start, duration));
        self
    }

    pub fn resample_audio(self, rate: u32) -> Self {
        self.video.add_filter(AudioResampleFilter::new(rate));
        self
    }
}
