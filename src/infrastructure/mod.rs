//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the microphone, audio output, terminal and filesystem.

pub mod artifact;
pub mod config;
pub mod playback;
pub mod recording;
pub mod waveform;

// Re-export adapters
pub use artifact::MemoryArtifactStore;
pub use config::XdgConfigStore;
pub use playback::RodioPlayer;
pub use recording::{create_capture_device, CpalCaptureDevice, ScriptedCaptureDevice};
pub use waveform::{NoOpWaveformSink, SparklineSink};
