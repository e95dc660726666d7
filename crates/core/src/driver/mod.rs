//! Process driver for running encoder commands.
//!
//! The orchestrator never spawns processes itself. It hands each pass
//! [`Command`](crate::encode::Command) to a [`ProcessDriver`], together with
//! the pass's optional progress listener.

mod error;
mod ffmpeg;
mod traits;

pub use error::ExecutionFailure;
pub use ffmpeg::FfmpegDriver;
pub use traits::ProcessDriver;
