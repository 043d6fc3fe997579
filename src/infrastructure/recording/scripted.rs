//! Scripted capture device
//!
//! Stands in for a microphone when there is no hardware: audio is pushed
//! by hand through a [`ScriptedFeed`], and every control call is counted.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::analyser::TimeDomainAnalyser;
use crate::application::ports::{
    CaptureDevice, CaptureError, CaptureEvent, CaptureEventSender, CaptureHandle, CaptureStream,
};
use crate::domain::recording::{AudioFormat, ContainerChunk, SampleBlock};
use crate::domain::waveform::DEFAULT_WINDOW;

/// Control calls observed on the most recent stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptedLog {
    pub pauses: usize,
    pub resumes: usize,
    pub finishes: usize,
    pub closes: usize,
}

#[derive(Default)]
struct Script {
    deny: Option<String>,
    close_error: Option<String>,
    finish_error: Option<String>,
    final_chunk: Option<Vec<u8>>,
    events: Option<CaptureEventSender>,
    format: Option<AudioFormat>,
    log: ScriptedLog,
    opens: usize,
}

type SharedScript = Arc<Mutex<Script>>;

fn lock(script: &Mutex<Script>) -> MutexGuard<'_, Script> {
    script.lock().unwrap_or_else(|e| e.into_inner())
}

/// Capture device driven by a [`ScriptedFeed`]
pub struct ScriptedCaptureDevice {
    sample_rate: u32,
    script: SharedScript,
    analyser: Arc<TimeDomainAnalyser>,
}

impl ScriptedCaptureDevice {
    /// Create a device reporting `sample_rate`, plus the feed that drives it
    pub fn new(sample_rate: u32) -> (Self, ScriptedFeed) {
        let script = SharedScript::default();
        let analyser = Arc::new(TimeDomainAnalyser::new(DEFAULT_WINDOW));
        let feed = ScriptedFeed {
            script: Arc::clone(&script),
            analyser: Arc::clone(&analyser),
        };
        let device = Self {
            sample_rate,
            script,
            analyser,
        };
        (device, feed)
    }
}

#[async_trait]
impl CaptureDevice for ScriptedCaptureDevice {
    async fn open(&self, format: AudioFormat) -> Result<CaptureHandle, CaptureError> {
        let mut script = lock(&self.script);
        script.opens += 1;
        if let Some(reason) = &script.deny {
            return Err(CaptureError::DeviceAcquisition(reason.clone()));
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        script.events = Some(events_tx);
        script.format = Some(format);
        script.log = ScriptedLog::default();

        let stream = ScriptedStream {
            script: Arc::clone(&self.script),
        };
        let analyser = Arc::clone(&self.analyser);
        Ok(CaptureHandle::new(
            self.sample_rate,
            events_rx,
            Box::new(stream),
            analyser,
        ))
    }
}

/// Test-side handle for pushing audio and inspecting control calls
#[derive(Clone)]
pub struct ScriptedFeed {
    script: SharedScript,
    analyser: Arc<TimeDomainAnalyser>,
}

impl ScriptedFeed {
    /// Make the next `open` fail with this reason
    pub fn deny_access(&self, reason: impl Into<String>) {
        lock(&self.script).deny = Some(reason.into());
    }

    pub fn allow_access(&self) {
        lock(&self.script).deny = None;
    }

    /// Make `close` report a failure
    pub fn fail_close(&self, reason: impl Into<String>) {
        lock(&self.script).close_error = Some(reason.into());
    }

    /// Make `finish` fail as an encoder flush would, without a final chunk
    pub fn fail_finish(&self, reason: impl Into<String>) {
        lock(&self.script).finish_error = Some(reason.into());
    }

    /// Chunk emitted by the encoder when it is flushed
    pub fn set_final_chunk(&self, bytes: Vec<u8>) {
        lock(&self.script).final_chunk = Some(bytes);
    }

    /// Deliver one raw block, as the processing callback would
    pub fn deliver_samples(&self, samples: Vec<f32>) {
        self.analyser.push(&samples);
        self.send(CaptureEvent::Samples(SampleBlock::new(samples)));
    }

    /// Deliver one encoder chunk
    pub fn deliver_chunk(&self, bytes: Vec<u8>) {
        self.send(CaptureEvent::Chunk(ContainerChunk::new(bytes)));
    }

    pub fn log(&self) -> ScriptedLog {
        lock(&self.script).log
    }

    /// Number of `open` attempts, including denied ones
    pub fn open_count(&self) -> usize {
        lock(&self.script).opens
    }

    /// Format requested by the most recent successful `open`
    pub fn opened_format(&self) -> Option<AudioFormat> {
        lock(&self.script).format
    }

    fn send(&self, event: CaptureEvent) {
        if let Some(events) = &lock(&self.script).events {
            let _ = events.send(event);
        }
    }
}

struct ScriptedStream {
    script: SharedScript,
}

#[async_trait]
impl CaptureStream for ScriptedStream {
    fn pause(&mut self) -> Result<(), CaptureError> {
        lock(&self.script).log.pauses += 1;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        lock(&self.script).log.resumes += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), CaptureError> {
        let mut script = lock(&self.script);
        script.log.finishes += 1;
        if let Some(reason) = script.finish_error.take() {
            script.events = None;
            return Err(CaptureError::Encoding(reason));
        }
        let final_chunk = script.final_chunk.take();
        if let Some(events) = script.events.take() {
            if let Some(bytes) = final_chunk {
                let _ = events.send(CaptureEvent::Chunk(ContainerChunk::new(bytes)));
            }
            let _ = events.send(CaptureEvent::Finished);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        let mut script = lock(&self.script);
        script.log.closes += 1;
        script.events = None;
        match &script.close_error {
            Some(reason) => Err(CaptureError::Teardown(reason.clone())),
            None => Ok(()),
        }
    }
}
