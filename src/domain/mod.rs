//! Domain layer - Core business logic
//!
//! Contains value objects, the session state machine, the WAV codec and
//! waveform geometry. This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod recording;
pub mod session;
pub mod waveform;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use recording::{AudioData, AudioFormat, AudioMimeType, Duration, SampleBlock};
pub use session::{InvalidStateTransition, RecordingPhase, RecordingSession};
pub use waveform::{WaveformFrame, WaveformTrace};
