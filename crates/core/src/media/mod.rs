//! Media subjects: the video being encoded and frames extracted from it.

mod frame;
mod timecode;
mod video;

pub use frame::Frame;
pub use timecode::{TimeCode, TimeCodeError};
pub use video::{Video, VideoFilters};
