//! Recording session use case
//!
//! `SessionController` is the single owner of everything a recording needs:
//! the open capture stream, the sample accumulator or chunk list, the
//! elapsed-time ticker, the waveform loop and the published artifact.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::ports::{
    ArtifactHandle, ArtifactStore, CaptureDevice, CaptureError, CaptureEvent, CaptureEvents,
    CaptureHandle, CaptureStream, TimeDomainSource, WaveformSink,
};
use super::timer::{ElapsedTimer, DEFAULT_TICK_INTERVAL};
use super::waveform::WaveformRenderer;
use crate::domain::config::DEFAULT_FRAME_INTERVAL_MS;
use crate::domain::recording::{
    concat_chunks, encode_wav, AudioData, AudioFormat, AudioMimeType, ContainerChunk, Duration,
    PcmAccumulator,
};
use crate::domain::session::{InvalidStateTransition, RecordingPhase, RecordingSession};

/// Errors from the session use case
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Capture(#[from] CaptureError),

    #[error("{0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("No recording to clear")]
    NoArtifact,
}

/// Tunables for a session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub format: AudioFormat,
    /// Waveform frame cadence
    pub frame_interval: StdDuration,
    /// Elapsed-time refresh cadence
    pub tick_interval: StdDuration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            format: AudioFormat::default(),
            frame_interval: StdDuration::from_millis(DEFAULT_FRAME_INTERVAL_MS),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// State handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: RecordingPhase,
    pub format: AudioFormat,
    pub elapsed_ms: u64,
    /// `mm:ss`
    pub elapsed_label: String,
    pub error_message: Option<String>,
    pub artifact: Option<ArtifactHandle>,
    /// Raw samples kept so far in the current recording
    pub captured_samples: usize,
}

/// Resources that exist only between start and stop
struct ActiveCapture {
    sample_rate: u32,
    container_mime: AudioMimeType,
    events: CaptureEvents,
    stream: Box<dyn CaptureStream>,
    analyser: Option<Arc<dyn TimeDomainSource>>,
    accumulator: PcmAccumulator,
    chunks: Vec<ContainerChunk>,
    finished: bool,
    closed: bool,
}

impl ActiveCapture {
    fn new(handle: CaptureHandle) -> Self {
        Self {
            sample_rate: handle.sample_rate,
            container_mime: handle.container_mime,
            events: handle.events,
            stream: handle.stream,
            analyser: Some(handle.analyser),
            accumulator: PcmAccumulator::new(),
            chunks: Vec::new(),
            finished: false,
            closed: false,
        }
    }

    /// Take everything already queued without waiting
    fn drain_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events.try_recv() {
            self.accept(event);
            count += 1;
        }
        count
    }

    /// Wait for the encoder's completion marker (or a closed channel)
    async fn drain_until_finished(&mut self) {
        while !self.finished {
            match self.events.recv().await {
                Some(event) => self.accept(event),
                None => break,
            }
        }
    }

    fn accept(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Samples(block) => {
                self.accumulator.offer(block);
            }
            CaptureEvent::Chunk(chunk) if !self.finished => {
                if !chunk.is_empty() {
                    self.chunks.push(chunk);
                }
            }
            CaptureEvent::Chunk(_) => debug!("ignoring chunk delivered after finish"),
            CaptureEvent::Finished => self.finished = true,
        }
    }

    /// Release the device; later calls do nothing
    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.stream.close() {
            warn!(error = %e, "ignoring capture teardown failure");
        }
    }

    fn encode(&self, format: AudioFormat) -> AudioData {
        match format {
            AudioFormat::ContainerEncoded => {
                AudioData::new(concat_chunks(&self.chunks), self.container_mime)
            }
            AudioFormat::RawPcm => encode_wav(self.accumulator.blocks(), self.sample_rate),
        }
    }
}

impl Drop for ActiveCapture {
    fn drop(&mut self) {
        self.close();
    }
}

/// Recording session controller
pub struct SessionController<D, A>
where
    D: CaptureDevice,
    A: ArtifactStore,
{
    device: D,
    artifacts: A,
    session: RecordingSession,
    active: Option<ActiveCapture>,
    timer: ElapsedTimer,
    renderer: WaveformRenderer,
    artifact: Option<ArtifactHandle>,
    error_message: Option<String>,
}

impl<D, A> SessionController<D, A>
where
    D: CaptureDevice,
    A: ArtifactStore,
{
    /// Create an idle session
    pub fn new(
        device: D,
        artifacts: A,
        sink: Arc<dyn WaveformSink>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            device,
            artifacts,
            session: RecordingSession::new(settings.format),
            active: None,
            timer: ElapsedTimer::new(settings.tick_interval),
            renderer: WaveformRenderer::new(sink, settings.frame_interval),
            artifact: None,
            error_message: None,
        }
    }

    pub fn phase(&self) -> RecordingPhase {
        self.session.phase()
    }

    pub fn format(&self) -> AudioFormat {
        self.session.format()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.timer.elapsed_ms()
    }

    /// Store holding published artifacts
    pub fn artifacts(&self) -> &A {
        &self.artifacts
    }

    pub fn artifact(&self) -> Option<&ArtifactHandle> {
        self.artifact.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Whether the waveform loop is currently drawing
    pub fn is_rendering(&self) -> bool {
        self.renderer.is_running()
    }

    /// Bytes of the current artifact, if any
    pub fn artifact_data(&self) -> Option<AudioData> {
        self.artifact
            .as_ref()
            .and_then(|handle| self.artifacts.fetch(handle))
    }

    /// Select the output format. Ignored unless idle.
    pub fn set_format(&mut self, format: AudioFormat) -> bool {
        let applied = self.session.set_format(format);
        if !applied {
            debug!(%format, phase = %self.session.phase(), "format change rejected");
        }
        applied
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let elapsed_ms = self.timer.elapsed_ms();
        SessionSnapshot {
            phase: self.session.phase(),
            format: self.session.format(),
            elapsed_ms,
            elapsed_label: Duration::from_millis(elapsed_ms).clock_label(),
            error_message: self.error_message.clone(),
            artifact: self.artifact.clone(),
            captured_samples: self
                .active
                .as_ref()
                .map_or(0, |a| a.accumulator.sample_count()),
        }
    }

    /// Acquire the device and begin recording.
    ///
    /// On failure the session stays idle and the error text is kept for
    /// display. No retry is attempted.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if !self.session.is_idle() {
            return Err(InvalidStateTransition {
                current_phase: self.session.phase(),
                action: "start recording".to_string(),
            }
            .into());
        }

        self.error_message = None;
        self.release_artifact();

        let format = self.session.format();
        info!(%format, "requesting capture device");
        let handle = match self.device.open(format).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "capture device unavailable");
                self.error_message = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.session.start()?;
        self.timer.reset();
        self.timer.run();
        self.renderer.start(Arc::clone(&handle.analyser));
        info!(sample_rate = handle.sample_rate, "recording started");
        self.active = Some(ActiveCapture::new(handle));
        Ok(())
    }

    /// Move already-delivered capture events into the session
    pub fn pump(&mut self) -> usize {
        self.active.as_mut().map_or(0, ActiveCapture::drain_pending)
    }

    /// Suspend intake. The waveform keeps drawing.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.session.pause()?;
        let format = self.session.format();
        if let Some(active) = self.active.as_mut() {
            // Everything queued so far arrived while recording.
            active.drain_pending();
            match format {
                AudioFormat::ContainerEncoded => {
                    if let Err(e) = active.stream.pause() {
                        warn!(error = %e, "encoder pause failed");
                    }
                }
                AudioFormat::RawPcm => active.accumulator.set_dropping(true),
            }
        }
        self.timer.freeze();
        info!(elapsed_ms = self.timer.elapsed_ms(), "recording paused");
        Ok(())
    }

    /// Resume intake; elapsed time continues from where it stopped
    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.session.resume()?;
        let format = self.session.format();
        if let Some(active) = self.active.as_mut() {
            // Everything queued so far arrived while paused.
            active.drain_pending();
            match format {
                AudioFormat::ContainerEncoded => {
                    if let Err(e) = active.stream.resume() {
                        warn!(error = %e, "encoder resume failed");
                    }
                }
                AudioFormat::RawPcm => active.accumulator.set_dropping(false),
            }
        }
        self.timer.run();
        info!("recording resumed");
        Ok(())
    }

    /// Finish the recording, release the device and publish the artifact.
    ///
    /// If the encoder cannot be flushed the device is still released, the
    /// session goes idle with the error kept for display, and no artifact
    /// is published.
    pub async fn stop(&mut self) -> Result<ArtifactHandle, SessionError> {
        self.session.check_stop()?;
        let format = self.session.format();
        self.timer.freeze();

        let finished = match self.active.take() {
            Some(active) => self.finish_capture(active, format).await,
            None => Ok(AudioData::new(Vec::new(), format.mime_type())),
        };
        self.session.stop()?;

        let audio = match finished {
            Ok(audio) => audio,
            Err(e) => {
                warn!(error = %e, "recording lost");
                self.error_message = Some(e.to_string());
                return Err(e.into());
            }
        };
        let handle = self.replace_artifact(audio);
        info!(artifact = %handle, bytes = handle.size_bytes(), "recording stopped");
        Ok(handle)
    }

    /// Drop the artifact and reset the clock
    pub fn clear(&mut self) -> Result<(), SessionError> {
        if self.artifact.is_none() {
            return Err(SessionError::NoArtifact);
        }
        self.release_artifact();
        self.timer.reset();
        self.error_message = None;
        Ok(())
    }

    /// Clear, then start a fresh recording
    pub async fn re_record(&mut self) -> Result<(), SessionError> {
        self.clear()?;
        self.start().await
    }

    /// Flush capture and tear everything down in dependency order:
    /// processing stops, the waveform loop lets go of its source, the device
    /// is closed, then the source itself is dropped.
    async fn finish_capture(
        &mut self,
        mut active: ActiveCapture,
        format: AudioFormat,
    ) -> Result<AudioData, CaptureError> {
        active.drain_pending();
        let flushed = active.stream.finish().await;
        match (&flushed, format) {
            (Ok(()), AudioFormat::ContainerEncoded) => active.drain_until_finished().await,
            _ => {
                active.drain_pending();
            }
        }

        self.renderer.stop().await;
        active.close();
        drop(active.analyser.take());

        flushed?;
        debug!(
            kept_samples = active.accumulator.sample_count(),
            dropped_blocks = active.accumulator.dropped_blocks(),
            chunks = active.chunks.len(),
            "capture finished"
        );
        Ok(active.encode(format))
    }

    fn replace_artifact(&mut self, audio: AudioData) -> ArtifactHandle {
        self.release_artifact();
        let handle = self.artifacts.publish(audio);
        self.artifact = Some(handle.clone());
        handle
    }

    fn release_artifact(&mut self) {
        if let Some(handle) = self.artifact.take() {
            if let Err(e) = self.artifacts.revoke(&handle) {
                warn!(error = %e, "ignoring artifact release failure");
            }
        }
    }
}
