//! `HH:MM:SS.ff` timecodes.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid timecode: {0}")]
pub struct TimeCodeError(pub String);

/// A position in a media file. `frames` holds hundredths of a second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeCode {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
}

const TIMECODE_PATTERN: &str = r"^(\d+):([0-5]?\d):([0-5]?\d)(?:[.:](\d{1,2}))?$";

fn timecode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIMECODE_PATTERN).expect("timecode pattern is a valid regex"))
}

impl TimeCode {
    pub fn new(hours: u32, minutes: u32, seconds: u32, frames: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
        }
    }

    /// Builds a timecode from seconds, rounding to hundredths.
    pub fn from_seconds(quantity: f64) -> Self {
        let quantity = quantity.max(0.0);
        let total_hundredths = (quantity * 100.0).round() as u64;
        let whole = total_hundredths / 100;

        Self {
            hours: (whole / 3600) as u32,
            minutes: ((whole % 3600) / 60) as u32,
            seconds: (whole % 60) as u32,
            frames: (total_hundredths % 100) as u32,
        }
    }

    pub fn to_seconds(&self) -> f64 {
        f64::from(self.hours) * 3600.0
            + f64::from(self.minutes) * 60.0
            + f64::from(self.seconds)
            + f64::from(self.frames) / 100.0
    }
}

impl FromStr for TimeCode {
    type Err = TimeCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = timecode_regex()
            .captures(s.trim())
            .ok_or_else(|| TimeCodeError(s.to_string()))?;

        let field = |i: usize| -> Result<u32, TimeCodeError> {
            match caps.get(i) {
                Some(m) => m.as_str().parse().map_err(|_| TimeCodeError(s.to_string())),
                None => Ok(0),
            }
        };

        Ok(Self::new(field(1)?, field(2)?, field(3)?, field(4)?))
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}
