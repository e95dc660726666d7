//! Filters for common video adjustments.

use crate::encode::Arg;
use crate::format::Format;
use crate::media::{TimeCode, Video};

use super::Filter;

/// Scales the output to a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeFilter {
    pub width: u32,
    pub height: u32,
}

impl ResizeFilter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Filter for ResizeFilter {
    fn apply(&self, _video: &Video, _format: &dyn Format) -> Vec<Arg> {
        vec![
            Arg::from("-s"),
            Arg::from(format!("{}x{}", self.width, self.height)),
        ]
    }
}

/// Forces the output frame rate, optionally with a GOP size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRateFilter {
    pub fps: f64,
    pub gop: Option<u32>,
}

impl FrameRateFilter {
    pub fn new(fps: f64) -> Self {
        Self { fps, gop: None }
    }

    pub fn with_gop(mut self, gop: u32) -> Self {
        self.gop = Some(gop);
        self
    }
}

impl Filter for FrameRateFilter {
    fn apply(&self, _video: &Video, _format: &dyn Format) -> Vec<Arg> {
        let rate = if self.fps.fract() == 0.0 {
            format!("{}", self.fps as i64)
        } else {
            format!("{:.3}", self.fps)
        };

        let mut args = vec![Arg::from("-r"), Arg::from(rate)];
        if let Some(gop) = self.gop {
            args.extend([Arg::from("-g"), Arg::from(gop)]);
        }
        args
    }
}

/// Keeps a section of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipFilter {
    pub start: TimeCode,
    pub duration: Option<TimeCode>,
}

impl ClipFilter {
    pub fn new(start: TimeCode, duration: Option<TimeCode>) -> Self {
        Self { start, duration }
    }
}

impl Filter for ClipFilter {
    fn apply(&self, _video: &Video, _format: &dyn Format) -> Vec<Arg> {
        let mut args = vec![Arg::from("-ss"), Arg::from(self.start.to_string())];
        if let Some(duration) = self.duration {
            args.extend([Arg::from("-t"), Arg::from(duration.to_string())]);
        }
        args
    }
}

/// Resamples audio to stereo at the given rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioResampleFilter {
    pub rate: u32,
}

impl AudioResampleFilter {
    pub fn new(rate: u32) -> Self {
        Self { rate }
    }
}

impl Filter for AudioResampleFilter {
    fn apply(&self, _video: &Video, _format: &dyn Format) -> Vec<Arg> {
        vec![
            Arg::from("-ac"),
            Arg::Int(2),
            Arg::from("-ar"),
            Arg::from(self.rate),
        ]
    }
}
