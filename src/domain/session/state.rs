//! Recording session state machine

use std::fmt;
use thiserror::Error;

use crate::domain::recording::AudioFormat;

/// Recording phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingPhase {
    #[default]
    Idle,
    Recording,
    Paused,
}

impl RecordingPhase {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for RecordingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_phase}")]
pub struct InvalidStateTransition {
    pub current_phase: RecordingPhase,
    pub action: String,
}

/// Recording session entity.
/// Owns the phase and the selected output format.
///
/// State machine:
///   IDLE -> RECORDING (start)
///   RECORDING -> PAUSED (pause)
///   PAUSED -> RECORDING (resume)
///   RECORDING | PAUSED -> IDLE (stop)
///
/// The format can only change while idle.
#[derive(Debug, Default)]
pub struct RecordingSession {
    phase: RecordingPhase,
    format: AudioFormat,
}

impl RecordingSession {
    /// Create a new idle session with the given format
    pub fn new(format: AudioFormat) -> Self {
        Self {
            phase: RecordingPhase::Idle,
            format,
        }
    }

    pub fn phase(&self) -> RecordingPhase {
        self.phase
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn is_idle(&self) -> bool {
        self.phase == RecordingPhase::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.phase == RecordingPhase::Recording
    }

    pub fn is_paused(&self) -> bool {
        self.phase == RecordingPhase::Paused
    }

    /// Select the output format. Ignored unless idle; returns whether it applied.
    pub fn set_format(&mut self, format: AudioFormat) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.format = format;
        true
    }

    /// Transition from IDLE to RECORDING
    pub fn start(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(RecordingPhase::Idle, RecordingPhase::Recording, "start recording")
    }

    /// Transition from RECORDING to PAUSED
    pub fn pause(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(RecordingPhase::Recording, RecordingPhase::Paused, "pause")
    }

    /// Transition from PAUSED to RECORDING
    pub fn resume(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(RecordingPhase::Paused, RecordingPhase::Recording, "resume")
    }

    /// Transition from RECORDING or PAUSED to IDLE
    pub fn stop(&mut self) -> Result<(), InvalidStateTransition> {
        if self.is_idle() {
            return Err(self.invalid("stop recording"));
        }
        self.phase = RecordingPhase::Idle;
        Ok(())
    }

    /// Check that `stop` would succeed without changing state
    pub fn check_stop(&self) -> Result<(), InvalidStateTransition> {
        if self.is_idle() {
            return Err(self.invalid("stop recording"));
        }
        Ok(())
    }

    fn transition(
        &mut self,
        from: RecordingPhase,
        to: RecordingPhase,
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if self.phase != from {
            return Err(self.invalid(action));
        }
        self.phase = to;
        Ok(())
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_phase: self.phase,
            action: action.to_string(),
        }
    }
}
