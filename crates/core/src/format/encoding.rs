//! Value-type format descriptor with presets.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

use super::{Format, FormatCapabilities};
use crate::encode::Arg;
use crate::media::Video;
use crate::probe::Probe;
use crate::progress::{DurationProgressListener, PassProgress, ProgressListener};

/// Fixed x264 tuning block: reference frames, CABAC, scene cut, deblocking,
/// motion search range, subpixel refinement, quantizer curve and trellis.
pub const DEFAULT_VIDEO_TUNING: [&str; 20] = [
    "-refs",
    "6",
    "-coder",
    "1",
    "-sc_threshold",
    "40",
    "-flags",
    "+loop",
    "-me_range",
    "16",
    "-subq",
    "7",
    "-i_qfactor",
    "0.71",
    "-qcomp",
    "0.6",
    "-qdiff",
    "4",
    "-trellis",
    "1",
];

/// Whether a format produces video or audio only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    #[default]
    Video,
    Audio,
}

/// Built-in format presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatPreset {
    /// H.264 + AAC, two passes
    X264,
    /// VP8 + Vorbis in WebM, two passes
    WebM,
    /// Theora + Vorbis in Ogg, two passes
    Theora,
    /// WMV2 + WMA2 in ASF, two passes
    Wmv,
    /// MPEG Audio Layer III
    Mp3,
    /// Advanced Audio Coding
    Aac,
    /// Free Lossless Audio Codec
    Flac,
    /// WAVE (uncompressed)
    Wav,
    /// Ogg Vorbis
    Vorbis,
}

#[derive(Debug, Error)]
#[error("Unknown format preset: {0}")]
pub struct UnknownPreset(pub String);

impl FromStr for FormatPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x264" | "h264" => Ok(Self::X264),
            "webm" => Ok(Self::WebM),
            "theora" | "ogv" => Ok(Self::Theora),
            "wmv" => Ok(Self::Wmv),
            "mp3" => Ok(Self::Mp3),
            "aac" => Ok(Self::Aac),
            "flac" => Ok(Self::Flac),
            "wav" => Ok(Self::Wav),
            "vorbis" | "ogg" => Ok(Self::Vorbis),
            other => Err(UnknownPreset(other.to_string())),
        }
    }
}

/// Target format as plain data.
///
/// Attach a progress channel with [`EncodingFormat::with_progress`] to get
/// [`PassProgress`] updates for every pass of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingFormat {
    #[serde(default)]
    pub kind: FormatKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    /// Video bitrate in kbps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kilo_bitrate: Option<u32>,
    /// Audio bitrate in kbps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_kilo_bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_channels: Option<u32>,
    #[serde(default = "default_passes")]
    pub passes: i32,
    #[serde(default)]
    pub extra_params: Vec<String>,
    /// Arguments emitted after the video bitrate; empty by default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub video_tuning: Vec<String>,
    #[serde(skip)]
    progress: Option<mpsc::Sender<PassProgress>>,
}

fn default_passes() -> i32 {
    1
}

impl EncodingFormat {
    fn new(kind: FormatKind) -> Self {
        Self {
            kind,
            video_codec: None,
            audio_codec: None,
            kilo_bitrate: None,
            audio_kilo_bitrate: None,
            audio_channels: None,
            passes: default_passes(),
            extra_params: Vec::new(),
            video_tuning: Vec::new(),
            progress: None,
        }
    }

    /// A single-pass video format with the given video codec.
    pub fn video(codec: impl Into<String>) -> Self {
        Self::new(FormatKind::Video).with_video_codec(codec)
    }

    /// A single-pass audio-only format with the given audio codec.
    pub fn audio(codec: impl Into<String>) -> Self {
        Self::new(FormatKind::Audio).with_audio_codec(codec)
    }

    pub fn from_preset(preset: FormatPreset) -> Self {
        match preset {
            FormatPreset::X264 => Self::video("libx264")
                .with_audio_codec("aac")
                .with_kilo_bitrate(1000)
                .with_audio_kilo_bitrate(128)
                .with_passes(2)
                .with_default_tuning(),
            FormatPreset::WebM => Self::video("libvpx")
                .with_audio_codec("libvorbis")
                .with_kilo_bitrate(1000)
                .with_audio_kilo_bitrate(128)
                .with_passes(2)
                .with_extra_params(["-f", "webm"]),
            FormatPreset::Theora => Self::video("libtheora")
                .with_audio_codec("libvorbis")
                .with_kilo_bitrate(1000)
                .with_audio_kilo_bitrate(128)
                .with_passes(2)
                .with_extra_params(["-f", "ogg"]),
            FormatPreset::Wmv => Self::video("wmv2")
                .with_audio_codec("wmav2")
                .with_kilo_bitrate(1000)
                .with_audio_kilo_bitrate(128)
                .with_passes(2)
                .with_extra_params(["-f", "asf"]),
            FormatPreset::Mp3 => Self::audio("libmp3lame").with_audio_kilo_bitrate(128),
            FormatPreset::Aac => Self::audio("aac").with_audio_kilo_bitrate(128),
            FormatPreset::Flac => Self::audio("flac"),
            FormatPreset::Wav => Self::audio("pcm_s16le"),
            FormatPreset::Vorbis => Self::audio("libvorbis")
                .with_audio_kilo_bitrate(128)
                .with_extra_params(["-f", "ogg"]),
        }
    }

    pub fn with_video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = Some(codec.into());
        self
    }

    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = Some(codec.into());
        self
    }

    pub fn with_kilo_bitrate(mut self, kbps: u32) -> Self {
        self.kilo_bitrate = Some(kbps);
        self
    }

    pub fn with_audio_kilo_bitrate(mut self, kbps: u32) -> Self {
        self.audio_kilo_bitrate = Some(kbps);
        self
    }

    pub fn with_audio_channels(mut self, channels: u32) -> Self {
        self.audio_channels = Some(channels);
        self
    }

    pub fn with_passes(mut self, passes: i32) -> Self {
        self.passes = passes;
        self
    }

    pub fn with_extra_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_video_tuning<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.video_tuning = params.into_iter().map(Into::into).collect();
        self
    }

    /// Uses [`DEFAULT_VIDEO_TUNING`].
    pub fn with_default_tuning(self) -> Self {
        self.with_video_tuning(DEFAULT_VIDEO_TUNING)
    }

    /// Reports progress of every pass to `tx`.
    pub fn with_progress(mut self, tx: mpsc::Sender<PassProgress>) -> Self {
        self.progress = Some(tx);
        self
    }
}

#[async_trait]
impl Format for EncodingFormat {
    fn capabilities(&self) -> FormatCapabilities {
        FormatCapabilities {
            video: self.kind == FormatKind::Video,
            audio: true,
            progress: self.progress.is_some(),
        }
    }

    fn passes(&self) -> i32 {
        self.passes
    }

    fn extra_params(&self) -> Vec<Arg> {
        self.extra_params.iter().map(Arg::from).collect()
    }

    fn video_codec(&self) -> Option<&str> {
        self.video_codec.as_deref()
    }

    fn audio_codec(&self) -> Option<&str> {
        self.audio_codec.as_deref()
    }

    fn kilo_bitrate(&self) -> Option<u32> {
        self.kilo_bitrate
    }

    fn audio_kilo_bitrate(&self) -> Option<u32> {
        self.audio_kilo_bitrate
    }

    fn audio_channels(&self) -> Option<u32> {
        self.audio_channels
    }

    fn video_tuning(&self) -> Vec<Arg> {
        self.video_tuning.iter().map(Arg::from).collect()
    }

    async fn create_progress_listener(
        &self,
        video: &Video,
        probe: &dyn Probe,
        pass: u32,
        total_passes: u32,
    ) -> Option<Box<dyn ProgressListener>> {
        let tx = self.progress.clone()?;

        let duration_secs = match probe.probe(video.path()).await {
            Ok(info) => Some(info.duration_secs),
            Err(e) => {
                warn!(path = %video.path().display(), error = %e, "Could not probe duration, progress will not be scaled");
                None
            }
        };

        Some(Box::new(DurationProgressListener::new(
            pass,
            total_passes,
            duration_secs,
            tx,
        )))
    }
}
