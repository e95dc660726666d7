use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Encoder binaries and invocation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Thread count passed as `-threads` to every encode; unset leaves it to ffmpeg.
    #[serde(default)]
    pub threads: Option<u32>,

    /// Timeout for a single pass in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Encoding arguments used instead of the format-derived ones by
    /// `Video::save_with_configured_commands`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

fn default_log_level() -> String {
    "warning".to_string()
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            threads: None,
            timeout_secs: default_timeout(),
            ffmpeg_log_level: default_log_level(),
            commands: None,
        }
    }
}

impl EncoderConfig {
    /// Creates a new config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Sets the encoder thread count.
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Sets the per-pass timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands = Some(commands.into_iter().map(Into::into).collect());
        self
    }
}

/// Scratch directory settings for multi-pass jobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    /// Root under which per-job scratch directories are created.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Unix permission bits of scratch directories.
    #[serde(default = "default_permissions")]
    pub permissions: u32,

    /// How many directory names are tried before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("passforge")
}

fn default_permissions() -> u32 {
    0o777
}

fn default_max_attempts() -> u32 {
    50
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            permissions: default_permissions(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl WorkspaceConfig {
    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }
}
