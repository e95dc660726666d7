//! Per-pass progress reporting.
//!
//! The process driver turns the encoder's `-progress` output into
//! [`ProgressEvent`]s and hands them to the [`ProgressListener`] attached to
//! the running pass. A listener is bound to one pass and is dropped when that
//! pass ends.

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// A raw progress sample emitted by the encoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    /// Frames encoded so far.
    pub frame: Option<u64>,
    /// Position in the output, in seconds.
    pub time_secs: f64,
    /// Encoding speed as reported (e.g. "1.5x").
    pub speed: Option<String>,
    /// Whether this is the final sample of the pass.
    pub finished: bool,
}

/// Observer for the progress of one pass.
pub trait ProgressListener: Send {
    /// Called for every progress sample, in order, before the pass completes.
    fn on_progress(&mut self, event: &ProgressEvent);
}

/// Accumulates `key=value` lines written by `ffmpeg -progress`.
///
/// ffmpeg writes one block of keys per update and terminates each block
/// with a `progress=continue` or `progress=end` line.
#[derive(Debug, Default)]
pub struct ProgressParser {
    frame: Option<u64>,
    time_secs: f64,
    speed: Option<String>,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line; returns an event when a block is complete.
    pub fn feed(&mut self, line: &str) -> Option<ProgressEvent> {
        let (key, value) = line.trim().split_once('=')?;
        let value = value.trim();

        match key.trim() {
            "frame" => self.frame = value.parse().ok(),
            // Both keys carry microseconds.
            "out_time_us" | "out_time_ms" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.time_secs = us / 1_000_000.0;
                }
            }
            "speed" => {
                if value != "N/A" {
                    self.speed = Some(value.to_string());
                }
            }
            "progress" => {
                return Some(ProgressEvent {
                    frame: self.frame,
                    time_secs: self.time_secs,
                    speed: self.speed.clone(),
                    finished: value == "end",
                });
            }
            _ => {}
        }

        None
    }
}

/// Job-level progress derived from a pass's events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassProgress {
    /// 1-based pass index.
    pub pass: u32,
    /// Total passes of the job.
    pub total_passes: u32,
    /// Percentage of the whole job, all passes included.
    pub percent: f32,
    /// Position within the current pass, in seconds.
    pub time_secs: f64,
    /// Duration of the source, if it could be probed.
    pub duration_secs: Option<f64>,
    /// Encoding speed as reported by the encoder.
    pub speed: Option<String>,
}

/// Converts encoder events into [`PassProgress`] using the source duration.
///
/// Intermediate updates are pushed with `try_send` and dropped when the
/// channel is full. The final update of a pass is always delivered: when the
/// channel is full it is sent from a spawned task, so it may arrive after
/// updates sent later.
#[derive(Debug)]
pub struct DurationProgressListener {
    pass: u32,
    total_passes: u32,
    duration_secs: Option<f64>,
    tx: mpsc::Sender<PassProgress>,
}

impl DurationProgressListener {
    pub fn new(
        pass: u32,
        total_passes: u32,
        duration_secs: Option<f64>,
        tx: mpsc::Sender<PassProgress>,
    ) -> Self {
        Self {
            pass,
            total_passes,
            duration_secs,
            tx,
        }
    }

    pub fn pass(&self) -> u32 {
        self.pass
    }

    pub fn total_passes(&self) -> u32 {
        self.total_passes
    }

    fn percent(&self, event: &ProgressEvent) -> f32 {
        let fraction = if event.finished {
            1.0
        } else {
            match self.duration_secs {
                Some(dur) if dur > 0.0 => (event.time_secs / dur).clamp(0.0, 1.0),
                _ => 0.0,
            }
        };
        let total = f64::from(self.total_passes.max(1));
        let done = f64::from(self.pass.saturating_sub(1));
        ((done + fraction) / total * 100.0) as f32
    }
}

impl ProgressListener for DurationProgressListener {
    fn on_progress(&mut self, event: &ProgressEvent) {
        let progress = PassProgress {
            pass: self.pass,
            total_passes: self.total_passes,
            percent: self.percent(event),
            time_secs: event.time_secs,
            duration_secs: self.duration_secs,
            speed: event.speed.clone(),
        };

        match self.tx.try_send(progress) {
            Ok(()) => {}
            Err(TrySendError::Full(progress)) if event.finished => match Handle::try_current() {
                Ok(handle) => {
                    let tx = self.tx.clone();
                    handle.spawn(async move {
                        let _ = tx.send(progress).await;
                    });
                }
                Err(_) => {
                    debug!(
                        pass = self.pass,
                        "Progress channel full outside a runtime, final update dropped"
                    );
                }
            },
            Err(TrySendError::Full(_)) => {
                debug!(pass = self.pass, "Progress channel full, update dropped");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(pass = self.pass, "Progress receiver gone, update dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(time_secs: f64, finished: bool) -> ProgressEvent {
        ProgressEvent {
            frame: None,
            time_secs,
            speed: None,
            finished,
        }
    }

    #[test]
    fn test_parser_emits_on_progress_line() {
        let mut parser = ProgressParser::new();
        assert!(parser.feed("frame=240").is_none());
        assert!(parser.feed("out_time_us=8000000").is_none());
        assert!(parser.feed("speed=2.01x").is_none());

        let ev = parser.feed("progress=continue").unwrap();
        assert_eq!(ev.frame, Some(240));
        assert!((ev.time_secs - 8.0).abs() < f64::EPSILON);
        assert_eq!(ev.speed.as_deref(), Some("2.01x"));
        assert!(!ev.finished);

        let ev = parser.feed("progress=end").unwrap();
        assert!(ev.finished);
    }

    #[test]
    fn test_parser_ignores_noise() {
        let mut parser = ProgressParser::new();
        assert!(parser.feed("Stream mapping:").is_none());
        assert!(parser.feed("speed=N/A").is_none());
        assert!(parser.feed("bitrate=N/A").is_none());
        let ev = parser.feed("progress=continue").unwrap();
        assert!(ev.speed.is_none());
        assert_eq!(ev.time_secs, 0.0);
    }

    #[tokio::test]
    async fn test_percent_spans_all_passes() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut listener = DurationProgressListener::new(2, 2, Some(100.0), tx);

        listener.on_progress(&event(50.0, false));
        listener.on_progress(&event(100.0, true));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.pass, 2);
        assert!((first.percent - 75.0).abs() < 0.01);
        let last = rx.recv().await.unwrap();
        assert!((last.percent - 100.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_final_update_survives_full_channel() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut listener = DurationProgressListener::new(1, 1, Some(10.0), tx.clone());
        tx.try_send(PassProgress {
            pass: 1,
            total_passes: 1,
            percent: 10.0,
            time_secs: 1.0,
            duration_secs: Some(10.0),
            speed: None,
        })
        .unwrap();

        listener.on_progress(&event(5.0, false));
        listener.on_progress(&event(10.0, true));

        assert_eq!(rx.recv().await.unwrap().percent, 10.0);
        let last = rx.recv().await.unwrap();
        assert!((last.percent - 100.0).abs() < 0.01);
        assert_eq!(last.time_secs, 10.0);
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut listener = DurationProgressListener::new(1, 1, None, tx);

        listener.on_progress(&event(1.0, false));
        listener.on_progress(&event(2.0, true));
    }

    #[tokio::test]
    async fn test_unknown_duration_reports_pass_start() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut listener = DurationProgressListener::new(1, 2, None, tx);

        listener.on_progress(&event(12.0, false));
        let progress = rx.recv().await.unwrap();
        assert_eq!(progress.percent, 0.0);
        assert_eq!(progress.duration_secs, None);
    }
}
