//! Artifact storage port
//!
//! Finished recordings are published to a store that hands back an opaque
//! handle; the handle must be revoked to free the backing bytes.

use std::fmt;

use thiserror::Error;

use crate::domain::recording::{AudioData, AudioMimeType};

/// Artifact errors
#[derive(Debug, Clone, Error)]
pub enum ArtifactError {
    #[error("Unknown or already revoked artifact: {0}")]
    UnknownHandle(String),
}

/// Opaque reference to a published recording
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactHandle {
    id: u64,
    mime_type: AudioMimeType,
    size_bytes: usize,
}

impl ArtifactHandle {
    pub fn new(id: u64, mime_type: AudioMimeType, size_bytes: usize) -> Self {
        Self {
            id,
            mime_type,
            size_bytes,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Object-URL style identifier
    pub fn uri(&self) -> String {
        format!("blob:voice-memo/{}", self.id)
    }

    /// Suggested download name, `recording.<ext>`
    pub fn suggested_filename(&self) -> String {
        format!("recording.{}", self.mime_type.extension())
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.uri(), self.mime_type)
    }
}

/// Port for holding finished recordings
pub trait ArtifactStore: Send + Sync {
    /// Take ownership of the audio and return a handle to it
    fn publish(&self, audio: AudioData) -> ArtifactHandle;

    /// Release the bytes behind a handle
    fn revoke(&self, handle: &ArtifactHandle) -> Result<(), ArtifactError>;

    /// Copy of the audio behind a live handle
    fn fetch(&self, handle: &ArtifactHandle) -> Option<AudioData>;
}
