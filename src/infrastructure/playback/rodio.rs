//! Rodio-based playback adapter
//!
//! Plays a finished recording through the default output device.

use std::io::Cursor;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};
use tracing::debug;

use crate::application::ports::{PlaybackError, Player};
use crate::domain::recording::AudioData;

/// Player implementation using rodio
pub struct RodioPlayer;

impl RodioPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RodioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Player for RodioPlayer {
    async fn play(&self, audio: AudioData) -> Result<(), PlaybackError> {
        // Output streams block until playback ends; keep them off the runtime
        tokio::task::spawn_blocking(move || play_sync(audio))
            .await
            .map_err(|e| PlaybackError::PlaybackFailed(format!("Task join error: {}", e)))?
    }
}

/// Decode and play to completion (called from spawn_blocking)
fn play_sync(audio: AudioData) -> Result<(), PlaybackError> {
    let mime = audio.mime_type();
    debug!(%mime, bytes = audio.size_bytes(), "starting playback");

    let source = Decoder::new(Cursor::new(audio.into_data()))
        .map_err(|_| PlaybackError::UnsupportedFormat(mime.to_string()))?;

    let (_stream, stream_handle) = OutputStream::try_default()
        .map_err(|e| PlaybackError::DeviceNotAvailable(e.to_string()))?;

    let sink =
        Sink::try_new(&stream_handle).map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;

    sink.append(source);
    sink.sleep_until_end();

    Ok(())
}
