//! Application layer - Use cases and port interfaces
//!
//! Contains the recording session use case, its helpers, and trait
//! definitions for external system interactions.

pub mod ports;
pub mod session;
pub mod timer;
pub mod waveform;

// Re-export use cases
pub use session::{SessionController, SessionError, SessionSettings, SessionSnapshot};
pub use timer::ElapsedTimer;
pub use waveform::WaveformRenderer;
