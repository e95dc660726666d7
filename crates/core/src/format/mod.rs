//! Target format descriptors.
//!
//! A [`Format`] describes what the encoder should produce: codecs, rates,
//! channel count, extra arguments and the number of passes. Optional features
//! are declared once through [`FormatCapabilities`] instead of being inferred
//! from the concrete type.

mod encoding;

pub use encoding::{EncodingFormat, FormatKind, FormatPreset, UnknownPreset, DEFAULT_VIDEO_TUNING};

use async_trait::async_trait;
use serde::Serialize;

use crate::encode::Arg;
use crate::media::Video;
use crate::probe::Probe;
use crate::progress::ProgressListener;

/// Optional features of a format, queried once per job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormatCapabilities {
    /// Produces a video stream; video codec and bitrate apply.
    pub video: bool,
    /// Produces an audio stream; audio codec, bitrate and channels apply.
    pub audio: bool,
    /// Can create per-pass progress listeners.
    pub progress: bool,
}

/// Target encoding parameters. Immutable for the duration of a job.
#[async_trait]
pub trait Format: Send + Sync {
    fn capabilities(&self) -> FormatCapabilities;

    /// Number of passes. Values below 1 are rejected when the job starts.
    fn passes(&self) -> i32;

    /// Raw arguments appended before the codec selectors.
    fn extra_params(&self) -> Vec<Arg> {
        Vec::new()
    }

    fn video_codec(&self) -> Option<&str> {
        None
    }

    fn audio_codec(&self) -> Option<&str> {
        None
    }

    fn kilo_bitrate(&self) -> Option<u32> {
        None
    }

    fn audio_kilo_bitrate(&self) -> Option<u32> {
        None
    }

    fn audio_channels(&self) -> Option<u32> {
        None
    }

    /// Encoder tuning arguments placed right after the video bitrate.
    fn video_tuning(&self) -> Vec<Arg> {
        Vec::new()
    }

    /// Creates the listener for pass `pass` of `total_passes`.
    ///
    /// Only called when [`FormatCapabilities::progress`] is set.
    async fn create_progress_listener(
        &self,
        _video: &Video,
        _probe: &dyn Probe,
        _pass: u32,
        _total_passes: u32,
    ) -> Option<Box<dyn ProgressListener>> {
        None
    }
}
