//! Waveform drawing port

use crate::domain::waveform::WaveformTrace;

/// Drawing surface for the live waveform.
///
/// Each call replaces whatever was drawn before.
pub trait WaveformSink: Send + Sync {
    fn render(&self, trace: &WaveformTrace);
}
