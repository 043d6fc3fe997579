//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod artifact;
pub mod capture;
pub mod config;
pub mod playback;
pub mod waveform;

// Re-export common types
pub use artifact::{ArtifactError, ArtifactHandle, ArtifactStore};
pub use capture::{
    CaptureDevice, CaptureError, CaptureEvent, CaptureEventSender, CaptureEvents, CaptureHandle,
    CaptureStream, TimeDomainSource,
};
pub use config::ConfigStore;
pub use playback::{PlaybackError, Player};
pub use waveform::WaveformSink;
