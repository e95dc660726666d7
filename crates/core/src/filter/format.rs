//! Filters derived from the target format and encoder configuration.

use std::fmt;

use crate::encode::Arg;
use crate::format::Format;
use crate::media::Video;

use super::Filter;

/// Stream a codec selector applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Video,
    Audio,
}

impl CodecKind {
    fn flag(self) -> &'static str {
        match self {
            Self::Video => "-vcodec",
            Self::Audio => "-acodec",
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// Selects the codec of one stream kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecFilter {
    kind: CodecKind,
    codec: String,
}

impl CodecFilter {
    pub fn video(codec: impl Into<String>) -> Self {
        Self {
            kind: CodecKind::Video,
            codec: codec.into(),
        }
    }

    pub fn audio(codec: impl Into<String>) -> Self {
        Self {
            kind: CodecKind::Audio,
            codec: codec.into(),
        }
    }

    pub fn kind(&self) -> CodecKind {
        self.kind
    }

    pub fn codec(&self) -> &str {
        &self.codec
    }
}

impl Filter for CodecFilter {
    fn apply(&self, _video: &Video, _format: &dyn Format) -> Vec<Arg> {
        vec![Arg::from(self.kind.flag()), Arg::from(&self.codec)]
    }
}

/// Passes the format's extra parameters through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtraParamsFilter;

impl Filter for ExtraParamsFilter {
    fn apply(&self, _video: &Video, format: &dyn Format) -> Vec<Arg> {
        format.extra_params()
    }
}

/// Sets the encoder thread count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadsFilter(pub u32);

impl Filter for ThreadsFilter {
    fn apply(&self, _video: &Video, _format: &dyn Format) -> Vec<Arg> {
        vec![Arg::from("-threads"), Arg::from(self.0)]
    }
}

/// Bitrate and channel arguments of the format.
///
/// Video bitrate and tuning only apply to formats with the video capability,
/// audio bitrate and channel count only to formats with the audio capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateControlFilter;

impl Filter for RateControlFilter {
    fn apply(&self, _video: &Video, format: &dyn Format) -> Vec<Arg> {
        let capabilities = format.capabilities();
        let mut args = Vec::new();

        if capabilities.video {
            if let Some(kbps) = format.kilo_bitrate() {
                args.extend([Arg::from("-b:v"), Arg::from(format!("{}k", kbps))]);
            }
            args.extend(format.video_tuning());
        }

        if capabilities.audio {
            if let Some(kbps) = format.audio_kilo_bitrate() {
                args.extend([Arg::from("-b:a"), Arg::from(format!("{}k", kbps))]);
            }
            if let Some(channels) = format.audio_channels() {
                args.extend([Arg::from("-ac"), Arg::from(channels)]);
            }
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{EncodingFormat, FormatPreset};
    use crate::testing::fixtures;

    #[test]
    fn test_codec_filters() {
        let video = fixtures::video("/in.mkv");
        let format = EncodingFormat::from_preset(FormatPreset::X264);

        assert_eq!(
            CodecFilter::video("libx264").apply(&video, &format),
            vec![Arg::from("-vcodec"), Arg::from("libx264")]
        );
        assert_eq!(
            CodecFilter::audio("aac").apply(&video, &format),
            vec![Arg::from("-acodec"), Arg::from("aac")]
        );
    }

    #[test]
    fn test_extra_params_passthrough() {
        let video = fixtures::video("/in.mkv");
        let format = EncodingFormat::video("libx264").with_extra_params(["-f", "mp4"]);

        assert_eq!(
            ExtraParamsFilter.apply(&video, &format),
            vec![Arg::from("-f"), Arg::from("mp4")]
        );
    }

    #[test]
    fn test_threads_is_numeric() {
        let video = fixtures::video("/in.mkv");
        let format = EncodingFormat::video("libx264");

        assert_eq!(
            ThreadsFilter(6).apply(&video, &format),
            vec![Arg::from("-threads"), Arg::Int(6)]
        );
    }

    #[test]
    fn test_rate_control_video_format() {
        let video = fixtures::video("/in.mkv");
        let format = EncodingFormat::video("libx264")
            .with_kilo_bitrate(2500)
            .with_audio_codec("aac")
            .with_audio_kilo_bitrate(160)
            .with_audio_channels(2);

        let args = RateControlFilter.apply(&video, &format);
        assert_eq!(
            args,
            vec![
                Arg::from("-b:v"),
                Arg::from("2500k"),
                Arg::from("-b:a"),
                Arg::from("160k"),
                Arg::from("-ac"),
                Arg::Int(2),
            ]
        );
    }

    #[test]
    fn test_tuning_follows_video_bitrate() {
        let video = fixtures::video("/in.mkv");
        let format = EncodingFormat::from_preset(FormatPreset::X264);

        let args: Vec<String> = RateControlFilter
            .apply(&video, &format)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            args.join(" "),
            "-b:v 1000k -refs 6 -coder 1 -sc_threshold 40 -flags +loop -me_range 16 \
             -subq 7 -i_qfactor 0.71 -qcomp 0.6 -qdiff 4 -trellis 1 -b:a 128k"
        );
    }

    #[test]
    fn test_rate_control_audio_only_ignores_video_bitrate() {
        let video = fixtures::video("/in.mkv");
        let format = EncodingFormat::audio("libmp3lame")
            .with_kilo_bitrate(2500)
            .with_video_tuning(["-refs", "6"])
            .with_audio_kilo_bitrate(320);

        let args = RateControlFilter.apply(&video, &format);
        assert_eq!(args, vec![Arg::from("-b:a"), Arg::from("320k")]);
    }
}
