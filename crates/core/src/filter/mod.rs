//! Composable argument filters.
//!
//! A [`Filter`] contributes encoder arguments for a given video and target
//! format. Filters are collected in a [`FilterPipeline`] and rendered in
//! insertion order; nothing is deduplicated, so a later filter overrides an
//! earlier one only by appearing later on the command line.

mod format;
mod pipeline;
mod simple;
mod video;

pub use format::{CodecFilter, CodecKind, ExtraParamsFilter, RateControlFilter, ThreadsFilter};
pub use pipeline::FilterPipeline;
pub use simple::SimpleFilter;
pub use video::{AudioResampleFilter, ClipFilter, FrameRateFilter, ResizeFilter};

use std::fmt;

use crate::encode::Arg;
use crate::format::Format;
use crate::media::Video;

/// Contributes an ordered list of arguments to an encoder command.
pub trait Filter: Send + Sync + fmt::Debug {
    fn apply(&self, video: &Video, format: &dyn Format) -> Vec<Arg>;
}
