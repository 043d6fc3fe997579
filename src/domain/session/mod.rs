//! Recording session domain module

mod state;

pub use state::{InvalidStateTransition, RecordingPhase, RecordingSession};
