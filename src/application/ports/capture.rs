//! Capture device port interfaces

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::recording::{AudioFormat, AudioMimeType, ContainerChunk, SampleBlock};
use crate::domain::waveform::WaveformFrame;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Could not access the microphone: {0}")]
    DeviceAcquisition(String),

    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Audio stream failed: {0}")]
    StreamFailed(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Failed to release capture resources: {0}")]
    Teardown(String),
}

impl CaptureError {
    /// Whether the error means the device could not be opened at all
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self, Self::DeviceAcquisition(_) | Self::NoInputDevice)
    }
}

/// Events delivered by an open capture stream, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// A fixed-size block of raw mono samples (raw PCM format)
    Samples(SampleBlock),
    /// A fragment of the encoded container stream (container format)
    Chunk(ContainerChunk),
    /// The encoder has flushed; nothing follows
    Finished,
}

/// Receiving end of a capture stream's event channel
pub type CaptureEvents = mpsc::UnboundedReceiver<CaptureEvent>;

/// Sending end of a capture stream's event channel
pub type CaptureEventSender = mpsc::UnboundedSender<CaptureEvent>;

/// Pull side of the live analysis buffer used by the waveform
pub trait TimeDomainSource: Send + Sync {
    /// Copy of the most recent time-domain window
    fn snapshot(&self) -> WaveformFrame;
}

/// Control side of an open capture stream
#[async_trait]
pub trait CaptureStream: Send {
    /// Suspend encoder output, keeping its internal state
    fn pause(&mut self) -> Result<(), CaptureError>;

    /// Resume encoder output
    fn resume(&mut self) -> Result<(), CaptureError>;

    /// Stop producing audio and flush the encoder.
    ///
    /// Implementations emit any final chunk followed by
    /// [`CaptureEvent::Finished`] before returning.
    async fn finish(&mut self) -> Result<(), CaptureError>;

    /// Release the underlying device. Called exactly once, after `finish`.
    fn close(&mut self) -> Result<(), CaptureError>;
}

/// Everything an opened device hands over to the session
pub struct CaptureHandle {
    /// Actual device sample rate
    pub sample_rate: u32,
    /// MIME type of the chunks emitted in container mode
    pub container_mime: AudioMimeType,
    pub events: CaptureEvents,
    pub stream: Box<dyn CaptureStream>,
    pub analyser: Arc<dyn TimeDomainSource>,
}

impl CaptureHandle {
    pub fn new(
        sample_rate: u32,
        events: CaptureEvents,
        stream: Box<dyn CaptureStream>,
        analyser: Arc<dyn TimeDomainSource>,
    ) -> Self {
        Self {
            sample_rate,
            container_mime: AudioFormat::ContainerEncoded.mime_type(),
            events,
            stream,
            analyser,
        }
    }

    /// Override the MIME type reported for container output
    pub fn with_container_mime(mut self, mime: AudioMimeType) -> Self {
        self.container_mime = mime;
        self
    }
}

/// Port for microphone access
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the input device and start streaming in the given format.
    ///
    /// May wait indefinitely for the platform to grant access.
    async fn open(&self, format: AudioFormat) -> Result<CaptureHandle, CaptureError>;
}
