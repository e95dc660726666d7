//! Mock format for testing progress wiring.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::encode::Arg;
use crate::format::{EncodingFormat, Format, FormatCapabilities};
use crate::media::Video;
use crate::probe::Probe;
use crate::progress::{ProgressEvent, ProgressListener};

/// A listener creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedListener {
    pub pass: u32,
    pub total_passes: u32,
}

/// Wraps an [`EncodingFormat`] and always reports progress.
///
/// Every listener it creates is recorded, along with the events delivered to
/// it tagged with the pass it was created for.
#[derive(Debug, Clone)]
pub struct MockFormat {
    inner: EncodingFormat,
    listeners: Arc<Mutex<Vec<RecordedListener>>>,
    events: Arc<Mutex<Vec<(u32, ProgressEvent)>>>,
}

impl MockFormat {
    pub fn new(inner: EncodingFormat) -> Self {
        Self {
            inner,
            listeners: Arc::new(Mutex::new(Vec::new())),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Listener creations, in order.
    pub fn recorded_listeners(&self) -> Vec<RecordedListener> {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Delivered events as `(pass, event)`, in order.
    pub fn recorded_events(&self) -> Vec<(u32, ProgressEvent)> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

struct RecordingListener {
    pass: u32,
    events: Arc<Mutex<Vec<(u32, ProgressEvent)>>>,
}

impl ProgressListener for RecordingListener {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((self.pass, event.clone()));
    }
}

#[async_trait]
impl Format for MockFormat {
    fn capabilities(&self) -> FormatCapabilities {
        FormatCapabilities {
            progress: true,
            ..self.inner.capabilities()
        }
    }

    fn passes(&self) -> i32 {
        self.inner.passes()
    }

    fn extra_params(&self) -> Vec<Arg> {
        self.inner.extra_params()
    }

    fn video_codec(&self) -> Option<&str> {
        self.inner.video_codec()
    }

    fn audio_codec(&self) -> Option<&str> {
        self.inner.audio_codec()
    }

    fn kilo_bitrate(&self) -> Option<u32> {
        self.inner.kilo_bitrate()
    }

    fn audio_kilo_bitrate(&self) -> Option<u32> {
        self.inner.audio_kilo_bitrate()
    }

    fn audio_channels(&self) -> Option<u32> {
        self.inner.audio_channels()
    }

    fn video_tuning(&self) -> Vec<Arg> {
        self.inner.video_tuning()
    }

    async fn create_progress_listener(
        &self,
        _video: &Video,
        _probe: &dyn Probe,
        pass: u32,
        total_passes: u32,
    ) -> Option<Box<dyn ProgressListener>> {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedListener { pass, total_passes });

        Some(Box::new(RecordingListener {
            pass,
            events: Arc::clone(&self.events),
        }))
    }
}
