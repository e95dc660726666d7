//! Encode job execution.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::command::{Arg, Command};
use super::error::EncodeError;
use super::passes::{expand_passes, validate_pass_count};
use crate::filter::{CodecFilter, ExtraParamsFilter, RateControlFilter, ThreadsFilter};
use crate::format::{Format, FormatCapabilities};
use crate::media::Video;

/// Lifecycle of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Building,
    PassRunning { pass: u32, total: u32 },
    Succeeded,
    /// `pass` is set when a pass failed, unset for setup or cleanup failures.
    Failed { pass: Option<u32> },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed { .. })
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Building => f.write_str("building"),
            Self::PassRunning { pass, total } => write!(f, "running pass {}/{}", pass, total),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed { pass: Some(pass) } => write!(f, "failed on pass {}", pass),
            Self::Failed { pass: None } => f.write_str("failed"),
        }
    }
}

/// Outcome of a successful job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeSummary {
    pub job_id: String,
    pub output_path: PathBuf,
    pub passes_run: u32,
    pub duration_ms: u64,
}

/// One encode of a video into an output file.
///
/// Passes run strictly in order and the first failing pass ends the job.
/// The job's scratch directory is released whatever the outcome.
pub struct EncodeJob<'a> {
    video: &'a Video,
    format: &'a dyn Format,
    output: PathBuf,
    job_id: String,
    state: JobState,
    /// Replaces the filter and format arguments when set.
    arguments: Option<Vec<String>>,
}

impl<'a> EncodeJob<'a> {
    pub fn new(video: &'a Video, format: &'a dyn Format, output: &Path) -> Self {
        Self {
            video,
            format,
            output: output.to_path_buf(),
            job_id: format!("passforge-passes-{}", Uuid::new_v4().simple()),
            state: JobState::Building,
            arguments: None,
        }
    }

    /// A job whose passes use `arguments` after the input instead of the
    /// video's filters and the format's codec and rate arguments.
    ///
    /// The format still decides the pass count and progress reporting.
    pub fn with_arguments(
        video: &'a Video,
        format: &'a dyn Format,
        output: &Path,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            arguments: Some(arguments),
            ..Self::new(video, format, output)
        }
    }

    /// Identifier keying the job's scratch directory.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// The command shared by every pass, without pass flags and output.
    pub fn base_command(&self) -> Command {
        self.build_base_command(self.format.capabilities())
    }

    fn build_base_command(&self, capabilities: FormatCapabilities) -> Command {
        let mut command = Command::new();
        command.push("-y").push("-i").push(self.video.path());

        if let Some(arguments) = &self.arguments {
            command.extend(arguments.iter().map(Arg::from));
            return command;
        }

        let mut filters = self.video.pipeline().clone();

        filters.add(ExtraParamsFilter);
        if let Some(threads) = self.video.config().encoder.threads {
            filters.add(ThreadsFilter(threads));
        }
        if capabilities.video {
            if let Some(codec) = self.format.video_codec() {
                filters.add(CodecFilter::video(codec));
            }
        }
        if capabilities.audio {
            if let Some(codec) = self.format.audio_codec() {
                filters.add(CodecFilter::audio(codec));
            }
        }
        filters.add(RateControlFilter);

        command.extend(filters.render(self.video, self.format).into_args());
        command
    }

    /// Runs every pass.
    pub async fn run(&mut self) -> Result<EncodeSummary, EncodeError> {
        let started = Instant::now();
        let video = self.video;
        let capabilities = self.format.capabilities();
        let base = self.build_base_command(capabilities);

        // Nothing may be allocated before the pass count is known to be valid.
        let total = match validate_pass_count(self.format.passes()) {
            Ok(total) => total,
            Err(e) => {
                self.state = JobState::Failed { pass: None };
                return Err(e);
            }
        };

        info!(
            job_id = %self.job_id,
            source = %video.path().display(),
            output = %self.output.display(),
            passes = total,
            "Starting encode job"
        );

        let workspace = video.workspace();
        let settings = &video.config().workspace;
        let scratch = match workspace
            .create_scratch_dir(settings.permissions, settings.max_attempts, &self.job_id)
            .await
        {
            Ok(dir) => dir,
            Err(e) => {
                error!(job_id = %self.job_id, error = %e, "Failed to allocate scratch directory");
                if let Err(clean_err) = workspace.clean(&self.job_id).await {
                    warn!(job_id = %self.job_id, error = %clean_err, "Scratch cleanup failed");
                }
                self.state = JobState::Failed { pass: None };
                return Err(e.into());
            }
        };
        let log_prefix = scratch.join(format!("pass-{}", Uuid::new_v4().simple()));

        let outcome = self.run_passes(&base, &log_prefix, capabilities).await;
        let cleaned = workspace.clean(&self.job_id).await;

        let result = match (outcome, cleaned) {
            (Ok(passes_run), Ok(())) => Ok(passes_run),
            (Ok(_), Err(clean_err)) => {
                error!(job_id = %self.job_id, error = %clean_err, "Scratch cleanup failed");
                Err(EncodeError::Workspace(clean_err))
            }
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(clean_err)) => {
                // The pass failure is what the caller needs to see.
                warn!(job_id = %self.job_id, error = %clean_err, "Scratch cleanup failed");
                Err(e)
            }
        };

        match result {
            Ok(passes_run) => {
                self.state = JobState::Succeeded;
                let duration_ms = started.elapsed().as_millis() as u64;
                info!(job_id = %self.job_id, passes = passes_run, duration_ms, "Encode job succeeded");
                Ok(EncodeSummary {
                    job_id: self.job_id.clone(),
                    output_path: self.output.clone(),
                    passes_run,
                    duration_ms,
                })
            }
            Err(e) => {
                if !matches!(self.state, JobState::Failed { .. }) {
                    self.state = JobState::Failed { pass: None };
                }
                Err(e)
            }
        }
    }

    async fn run_passes(
        &mut self,
        base: &Command,
        log_prefix: &Path,
        capabilities: FormatCapabilities,
    ) -> Result<u32, EncodeError> {
        let video = self.video;
        let output = self.output.to_string_lossy().to_string();
        let prefix = log_prefix.to_string_lossy().to_string();
        let passes = expand_passes(base, self.format.passes(), &output, &prefix)?;

        let mut passes_run = 0;
        for pass in passes {
            self.state = JobState::PassRunning {
                pass: pass.index,
                total: pass.total,
            };
            debug!(
                job_id = %self.job_id,
                pass = pass.index,
                total = pass.total,
                command = %pass.command,
                "Running pass"
            );

            let listener = if capabilities.progress {
                self.format
                    .create_progress_listener(video, video.probe().as_ref(), pass.index, pass.total)
                    .await
            } else {
                None
            };

            if let Err(failure) = video.driver().execute(&pass.command, false, listener).await {
                error!(
                    job_id = %self.job_id,
                    pass = pass.index,
                    total = pass.total,
                    code = ?failure.code,
                    error = %failure,
                    "Pass failed"
                );
                self.state = JobState::Failed {
                    pass: Some(pass.index),
                };
                return Err(EncodeError::encoding_failed(pass.index, pass.total, failure));
            }

            passes_run += 1;
            info!(job_id = %self.job_id, pass = pass.index, total = pass.total, "Pass completed");
        }

        Ok(passes_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ExecutionFailure;
    use crate::encode::Arg;
    use crate::filter::SimpleFilter;
    use crate::format::EncodingFormat;
    use crate::testing::{fixtures, MockDriver, MockWorkspace};
    use std::sync::Arc;

    #[test]
    fn test_base_command_order() {
        let mut video = fixtures::video("/in.mkv");
        video.add_filter(SimpleFilter::new(["-ss", "10"]));
        let format = EncodingFormat::video("libx264")
            .with_audio_codec("aac")
            .with_kilo_bitrate(800)
            .with_extra_params(["-f", "mp4"]);

        let job = EncodeJob::new(&video, &format, Path::new("/out.mp4"));
        assert_eq!(
            job.base_command().to_string(),
            "-y -i /in.mkv -ss 10 -f mp4 -vcodec libx264 -acodec aac -b:v 800k"
        );
    }

    #[test]
    fn test_base_command_threads_from_config() {
        let mut config = crate::config::Config::default();
        config.encoder.threads = Some(3);
        let video = fixtures::video_with_config("/in.mkv", config);
        let format = EncodingFormat::video("libx264");

        let job = EncodeJob::new(&video, &format, Path::new("/out.mp4"));
        let command = job.base_command();
        assert_eq!(command.value_of("-threads"), Some(&Arg::Int(3)));
        assert!(command.position("-threads") < command.position("-vcodec"));
    }

    #[test]
    fn test_base_command_does_not_touch_video_filters() {
        let video = fixtures::video("/in.mkv");
        let format = EncodingFormat::video("libx264");

        let _ = EncodeJob::new(&video, &format, Path::new("/out.mp4")).base_command();
        assert!(video.pipeline().is_empty());
    }

    #[test]
    fn test_explicit_arguments_replace_filters_and_format() {
        let mut video = fixtures::video("/in.mkv");
        video.add_filter(SimpleFilter::new(["-ss", "10"]));
        let format = EncodingFormat::from_preset(crate::format::FormatPreset::X264);
        let arguments = vec!["-vcodec".to_string(), "libx265".to_string()];

        let job = EncodeJob::with_arguments(&video, &format, Path::new("/out.mp4"), arguments);
        assert_eq!(job.base_command().to_string(), "-y -i /in.mkv -vcodec libx265");
        assert_eq!(job.state(), JobState::Building);
    }

    #[tokio::test]
    async fn test_state_after_success() {
        let video = fixtures::video("/in.mkv");
        let format = EncodingFormat::video("libx264").with_passes(2);

        let mut job = EncodeJob::new(&video, &format, Path::new("/out.mp4"));
        assert_eq!(job.state(), JobState::Building);

        let summary = job.run().await.unwrap();
        assert_eq!(summary.passes_run, 2);
        assert_eq!(summary.job_id, job.job_id());
        assert_eq!(job.state(), JobState::Succeeded);
        assert!(job.state().is_terminal());
    }

    #[tokio::test]
    async fn test_state_after_pass_failure() {
        let driver = Arc::new(MockDriver::new());
        driver
            .fail_on_call(1, ExecutionFailure::exited(Some(1), "Error opening input"))
            .await;
        let video = fixtures::video_with_driver("/in.mkv", driver.clone());
        let format = EncodingFormat::video("libx264").with_passes(2);

        let mut job = EncodeJob::new(&video, &format, Path::new("/out.mp4"));
        let err = job.run().await.unwrap_err();

        assert!(matches!(err, EncodeError::Encoding { pass: 1, total: 2, .. }));
        assert_eq!(job.state(), JobState::Failed { pass: Some(1) });
        assert_eq!(driver.execution_count().await, 1);
    }

    #[tokio::test]
    async fn test_cleanup_failure_after_success_is_reported() {
        let workspace = Arc::new(MockWorkspace::new());
        workspace.set_clean_error(true).await;
        let video = fixtures::video_with_workspace("/in.mkv", workspace.clone());
        let format = EncodingFormat::video("libx264");

        let mut job = EncodeJob::new(&video, &format, Path::new("/out.mp4"));
        let err = job.run().await.unwrap_err();
        assert!(matches!(err, EncodeError::Workspace(_)));
        assert_eq!(job.state(), JobState::Failed { pass: None });
    }

    #[tokio::test]
    async fn test_cleanup_failure_does_not_mask_pass_failure() {
        let driver = Arc::new(MockDriver::new());
        driver
            .fail_on_call(2, ExecutionFailure::exited(Some(187), "rate control"))
            .await;
        let workspace = Arc::new(MockWorkspace::new());
        workspace.set_clean_error(true).await;
        let video = fixtures::video_with_parts("/in.mkv", driver.clone(), workspace.clone());
        let format = EncodingFormat::video("libx264").with_passes(2);

        let err = video.encode(&format, "/out.mp4").await.unwrap_err();
        assert!(matches!(err, EncodeError::Encoding { pass: 2, .. }));
        assert_eq!(err.code(), Some(187));
        assert_eq!(workspace.clean_calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_scratch_allocation_failure_spawns_nothing() {
        let driver = Arc::new(MockDriver::new());
        let workspace = Arc::new(MockWorkspace::new());
        workspace.set_create_error(true).await;
        let video = fixtures::video_with_parts("/in.mkv", driver.clone(), workspace.clone());
        let format = EncodingFormat::video("libx264").with_passes(2);

        let err = video.encode(&format, "/out.mp4").await.unwrap_err();
        assert!(matches!(err, EncodeError::Workspace(_)));
        assert_eq!(driver.execution_count().await, 0);
        assert_eq!(workspace.clean_calls().await.len(), 1);
    }
}
