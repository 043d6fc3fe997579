//! Live waveform loop
//!
//! Pulls the latest time-domain window on every frame and hands the traced
//! polyline to a sink. The loop only cares about its own lifetime; pausing
//! a recording does not affect it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::ports::{TimeDomainSource, WaveformSink};
use crate::domain::waveform::TraceStyle;

/// Default canvas width in logical pixels
pub const DEFAULT_CANVAS_WIDTH: f32 = 360.0;

/// Default canvas height in logical pixels
pub const DEFAULT_CANVAS_HEIGHT: f32 = 80.0;

/// Cancellable periodic renderer
pub struct WaveformRenderer {
    sink: Arc<dyn WaveformSink>,
    frame_interval: Duration,
    width: f32,
    height: f32,
    style: TraceStyle,
    task: Option<JoinHandle<()>>,
}

impl WaveformRenderer {
    pub fn new(sink: Arc<dyn WaveformSink>, frame_interval: Duration) -> Self {
        Self {
            sink,
            frame_interval,
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            style: TraceStyle::default(),
            task: None,
        }
    }

    /// Use a different canvas size
    pub fn with_canvas(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start drawing frames from `source`. A running loop is replaced.
    pub fn start(&mut self, source: Arc<dyn TimeDomainSource>) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let sink = Arc::clone(&self.sink);
        let (width, height, style) = (self.width, self.height, self.style);
        let period = self.frame_interval;

        self.task = Some(tokio::spawn(async move {
            let mut frames = interval(period);
            // Frame callbacks may arrive late; never try to catch up.
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                frames.tick().await;
                let trace = source.snapshot().trace(width, height, style);
                sink.render(&trace);
            }
        }));
    }

    /// Cancel the loop and wait until it has let go of its source
    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for WaveformRenderer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
