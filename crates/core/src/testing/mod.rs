//! Testing utilities and mock implementations.
//!
//! The mocks stand in for the encoder binary, ffprobe and the scratch
//! filesystem, so whole encode jobs can run in tests without ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use passforge_core::testing::{fixtures, MockDriver};
//!
//! let driver = Arc::new(MockDriver::new());
//! let video = fixtures::video_with_driver("/in.mkv", driver.clone());
//!
//! video.save(&EncodingFormat::video("libx264").with_passes(2), "/out.mp4").await?;
//! assert_eq!(driver.execution_count().await, 2);
//! ```

mod mock_driver;
mod mock_format;
mod mock_probe;
mod mock_workspace;

pub use mock_driver::{MockDriver, RecordedExecution};
pub use mock_format::{MockFormat, RecordedListener};
pub use mock_probe::MockProbe;
pub use mock_workspace::{MockWorkspace, RecordedScratchDir};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::{MockDriver, MockProbe, MockWorkspace};
    use crate::config::Config;
    use crate::driver::ProcessDriver;
    use crate::media::Video;
    use crate::probe::Probe;
    use crate::workspace::Workspace;

    /// A video wired to fresh mocks and the default configuration.
    pub fn video(path: impl Into<PathBuf>) -> Video {
        video_with(
            path,
            Arc::new(MockDriver::new()),
            Arc::new(MockProbe::new()),
            Arc::new(MockWorkspace::new()),
            Config::default(),
        )
    }

    pub fn video_with_driver(path: impl Into<PathBuf>, driver: Arc<dyn ProcessDriver>) -> Video {
        video_with(
            path,
            driver,
            Arc::new(MockProbe::new()),
            Arc::new(MockWorkspace::new()),
            Config::default(),
        )
    }

    pub fn video_with_workspace(
        path: impl Into<PathBuf>,
        workspace: Arc<dyn Workspace>,
    ) -> Video {
        video_with(
            path,
            Arc::new(MockDriver::new()),
            Arc::new(MockProbe::new()),
            workspace,
            Config::default(),
        )
    }

    pub fn video_with_parts(
        path: impl Into<PathBuf>,
        driver: Arc<dyn ProcessDriver>,
        workspace: Arc<dyn Workspace>,
    ) -> Video {
        video_with(
            path,
            driver,
            Arc::new(MockProbe::new()),
            workspace,
            Config::default(),
        )
    }

    pub fn video_with_config(path: impl Into<PathBuf>, config: Config) -> Video {
        video_with(
            path,
            Arc::new(MockDriver::new()),
            Arc::new(MockProbe::new()),
            Arc::new(MockWorkspace::new()),
            config,
        )
    }

    /// A video with every collaborator supplied.
    pub fn video_with(
        path: impl Into<PathBuf>,
        driver: Arc<dyn ProcessDriver>,
        probe: Arc<dyn Probe>,
        workspace: Arc<dyn Workspace>,
        config: Config,
    ) -> Video {
        Video::new(path, driver, probe, workspace, Arc::new(config))
    }
}
