//! Encode job orchestration.
//!
//! This module turns a [`Video`](crate::media::Video) and a
//! [`Format`](crate::format::Format) into one encoder command per pass and
//! runs them in order.
//!
//! # Build order
//!
//! 1. `-y -i <source>`
//! 2. the video's persistent filters
//! 3. format-derived filters: extra params, threads, codec selectors, rates
//! 4. per pass: `-pass <i> -passlogfile <prefix>` when there is more than one
//!    pass, then the output path
//!
//! # Example
//!
//! ```ignore
//! use passforge_core::{Engine, EncodingFormat, FormatPreset};
//!
//! let engine = Engine::from_config(config);
//! let video = engine.open("/media/input.mkv").await?;
//!
//! let format = EncodingFormat::from_preset(FormatPreset::X264);
//! let summary = video.encode(&format, "/media/output.mp4").await?;
//! println!("{} passes in {} ms", summary.passes_run, summary.duration_ms);
//! ```

mod command;
mod error;
mod executor;
mod passes;

pub use command::{Arg, Command};
pub use error::EncodeError;
pub use executor::{EncodeJob, EncodeSummary, JobState};
pub use passes::{expand_passes, validate_pass_count, Pass};
