//! FFmpeg process driver.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as ProcessCommand;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::error::ExecutionFailure;
use super::traits::ProcessDriver;
use crate::config::EncoderConfig;
use crate::encode::Command;
use crate::progress::{ProgressListener, ProgressParser};

/// Number of diagnostic stderr lines kept for error reporting.
const STDERR_TAIL_LINES: usize = 20;

/// Runs commands through the configured ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegDriver {
    config: EncoderConfig,
}

impl FfmpegDriver {
    /// Creates a new driver with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates a driver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    /// Full argument list passed to the binary.
    ///
    /// Global flags go first; `-progress` is only requested when somebody
    /// listens to it.
    fn build_args(&self, command: &Command, with_progress: bool) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ];

        if with_progress {
            args.extend([
                "-nostats".to_string(),
                "-progress".to_string(),
                "pipe:2".to_string(),
            ]);
        }

        args.extend(command.to_strings());
        args
    }

    async fn spawn_background(&self, command: &Command) -> Result<(), ExecutionFailure> {
        let child = ProcessCommand::new(&self.config.ffmpeg_path)
            .args(self.build_args(command, false))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ExecutionFailure::spawn_failed(&self.config.ffmpeg_path, &e))?;

        debug!(pid = ?child.id(), "Spawned ffmpeg in background");
        Ok(())
    }

    async fn run_to_completion(
        &self,
        command: &Command,
        mut listener: Option<Box<dyn ProgressListener>>,
    ) -> Result<(), ExecutionFailure> {
        let args = self.build_args(command, listener.is_some());
        debug!(args = ?args, "Running ffmpeg");

        let mut child = ProcessCommand::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutionFailure::spawn_failed(&self.config.ffmpeg_path, &e))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExecutionFailure::new(None, "ffmpeg stderr was not captured"))?;
        let mut reader = BufReader::new(stderr);

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut parser = ProgressParser::new();
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut buf = Vec::new();

            // stderr must be drained to EOF whatever it contains, or ffmpeg
            // blocks on a full pipe and never exits.
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf).await? == 0 {
                    break;
                }
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();

                if is_progress_line(&line) {
                    if let Some(event) = parser.feed(&line) {
                        if let Some(listener) = listener.as_mut() {
                            listener.on_progress(&event);
                        }
                    }
                    continue;
                }

                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }

            // Wait for process to complete
            let status = child.wait().await?;
            let diagnostics = tail.into_iter().collect::<Vec<_>>().join("\n");
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, diagnostics))
        })
        .await;

        match result {
            Ok(Ok((status, diagnostics))) => {
                if status.success() {
                    Ok(())
                } else {
                    Err(ExecutionFailure::exited(status.code(), diagnostics))
                }
            }
            Ok(Err(e)) => Err(ExecutionFailure::io(e)),
            Err(_) => {
                // Kill the process on timeout
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed out ffmpeg process");
                }
                Err(ExecutionFailure::timed_out(self.config.timeout_secs))
            }
        }
    }
}

/// Whether `line` is a `key=value` line of the `-progress` protocol.
fn is_progress_line(line: &str) -> bool {
    match line.trim().split_once('=') {
        Some((key, _)) => {
            !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

#[async_trait]
impl ProcessDriver for FfmpegDriver {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn execute(
        &self,
        command: &Command,
        background: bool,
        listener: Option<Box<dyn ProgressListener>>,
    ) -> Result<(), ExecutionFailure> {
        if background {
            return self.spawn_background(command).await;
        }
        self.run_to_completion(command, listener).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::Arg;
    use crate::progress::ProgressEvent;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    fn sample_command() -> Command {
        Command::from(vec![
            Arg::from("-y"),
            Arg::from("-i"),
            Arg::from("/in.mkv"),
            Arg::from("/out.mp4"),
        ])
    }

    #[test]
    fn test_build_args_without_listener() {
        let driver = FfmpegDriver::with_defaults();
        let args = driver.build_args(&sample_command(), false);

        assert_eq!(&args[..3], &["-hide_banner", "-loglevel", "warning"]);
        assert!(!args.contains(&"-progress".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/out.mp4"));
    }

    #[test]
    fn test_build_args_with_listener() {
        let driver = FfmpegDriver::with_defaults();
        let args = driver.build_args(&sample_command(), true);

        let progress = args.iter().position(|a| a == "-progress").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[progress + 1], "pipe:2");
        assert!(progress < input);
    }

    #[test]
    fn test_is_progress_line() {
        assert!(is_progress_line("out_time_us=1000"));
        assert!(is_progress_line("progress=end"));
        assert!(!is_progress_line("[libx264 @ 0x55] using cpu capabilities"));
        assert!(!is_progress_line("Input #0, matroska,webm, from 'in.mkv':"));
        assert!(!is_progress_line("  Metadata: title = x"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let config = EncoderConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/passforge/ffmpeg"),
            ..Default::default()
        };
        let driver = FfmpegDriver::new(config);

        let failure = driver
            .execute(&sample_command(), false, None)
            .await
            .unwrap_err();
        assert_eq!(failure.code, None);
        assert!(failure.message.contains("/nonexistent/passforge/ffmpeg"));
    }

    #[cfg(unix)]
    struct Collect(Arc<Mutex<Vec<ProgressEvent>>>);

    #[cfg(unix)]
    impl ProgressListener for Collect {
        fn on_progress(&mut self, event: &ProgressEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    /// Writes an executable shell script standing in for ffmpeg.
    #[cfg(unix)]
    fn fake_ffmpeg(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_progress_delivered_before_execute_resolves() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = fake_ffmpeg(
            &dir,
            r#"echo "[libx264 @ 0x1] using cpu capabilities" >&2
printf 'frame=24\nout_time_us=1000000\nspeed=2.0x\nprogress=continue\n' >&2
echo "Error while filtering" >&2
printf 'frame=48\nout_time_us=2000000\nspeed=2.1x\nprogress=continue\n' >&2
printf 'frame=60\nout_time_us=2500000\nspeed=2.1x\nprogress=end\n' >&2
echo "Conversion failed!" >&2
exit 2"#,
        );
        let driver = FfmpegDriver::new(EncoderConfig::with_paths(script, PathBuf::from("ffprobe")));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let failure = driver
            .execute(&sample_command(), false, Some(Box::new(Collect(seen.clone()))))
            .await
            .unwrap_err();

        let events = seen.lock().unwrap().clone();
        let times: Vec<f64> = events.iter().map(|e| e.time_secs).collect();
        assert_eq!(times, vec![1.0, 2.0, 2.5]);
        assert_eq!(events[1].frame, Some(48));
        assert!(!events[1].finished);
        assert!(events[2].finished);

        assert_eq!(failure.code, Some(2));
        let stderr = failure.stderr.unwrap();
        assert!(stderr.contains("Error while filtering"));
        assert!(stderr.contains("Conversion failed!"));
        assert!(!stderr.contains("out_time_us"));
        assert!(!stderr.contains("progress="));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_stderr_keeps_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = fake_ffmpeg(
            &dir,
            r#"printf '\377\376 title\n' >&2
head -c 300000 /dev/zero | tr '\0' 'x' >&2
printf '\nOutput file is empty, nothing was encoded\n' >&2
exit 1"#,
        );
        let config = EncoderConfig::with_paths(script, PathBuf::from("ffprobe")).with_timeout(20);
        let driver = FfmpegDriver::new(config);

        let started = std::time::Instant::now();
        let failure = driver
            .execute(&sample_command(), false, None)
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(20));
        assert_eq!(failure.code, Some(1));
        assert_eq!(failure.message, "ffmpeg exited with code 1");
        assert!(failure
            .stderr
            .unwrap()
            .ends_with("Output file is empty, nothing was encoded"));
    }
}
