//! Mock probe for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::probe::{MediaInfo, Probe, ProbeError};

/// Mock implementation of the Probe trait.
///
/// Returns pre-configured results by path, falling back to a generated
/// two-hour 1080p video (or three-minute audio file) based on extension.
#[derive(Debug)]
pub struct MockProbe {
    /// Pre-configured probe results by path.
    results: Arc<RwLock<HashMap<PathBuf, MediaInfo>>>,
    /// If set, the next probe will fail with this error.
    next_error: Arc<RwLock<Option<ProbeError>>>,
    /// Number of probes performed.
    probes: Arc<RwLock<usize>>,
}

impl Default for MockProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProbe {
    /// Create a new mock probe.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            probes: Arc::new(RwLock::new(0)),
        }
    }

    /// Set a probe result for a specific path.
    pub async fn set_probe_result(&self, path: impl AsRef<Path>, info: MediaInfo) {
        self.results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), info);
    }

    /// Configure the next probe to fail with the given error.
    pub async fn set_next_error(&self, error: ProbeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get the number of probes performed.
    pub async fn probe_count(&self) -> usize {
        *self.probes.read().await
    }

    /// Create a default MediaInfo for testing.
    pub fn default_info(path: &Path) -> MediaInfo {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown");

        let is_video = matches!(extension, "mkv" | "mp4" | "avi" | "mov" | "webm");

        MediaInfo {
            path: path.to_path_buf(),
            size_bytes: 100 * 1024 * 1024, // 100 MB
            duration_secs: if is_video { 7200.0 } else { 180.0 },
            format: extension.to_string(),
            audio_codec: Some("aac".to_string()),
            audio_bitrate_kbps: Some(192),
            audio_sample_rate: Some(48000),
            audio_channels: Some(2),
            video_codec: is_video.then(|| "h264".to_string()),
            video_width: is_video.then_some(1920),
            video_height: is_video.then_some(1080),
            video_fps: is_video.then_some(24.0),
        }
    }
}

#[async_trait]
impl Probe for MockProbe {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        *self.probes.write().await += 1;

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        if let Some(info) = self.results.read().await.get(path) {
            return Ok(info.clone());
        }

        Ok(Self::default_info(path))
    }
}
