//! Playback port for listening back to a recording

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::AudioData;

/// Errors that can occur during playback
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Audio output not available: {0}")]
    DeviceNotAvailable(String),

    #[error("Cannot decode {0} for playback")]
    UnsupportedFormat(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Port trait for artifact playback
#[async_trait]
pub trait Player: Send + Sync {
    /// Play the audio to completion
    async fn play(&self, audio: AudioData) -> Result<(), PlaybackError>;
}
