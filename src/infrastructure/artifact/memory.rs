//! In-memory artifact store
//!
//! Holds published recordings until their handle is revoked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::application::ports::{ArtifactError, ArtifactHandle, ArtifactStore};
use crate::domain::recording::AudioData;

/// Process-local artifact store
#[derive(Default)]
pub struct MemoryArtifactStore {
    next_id: AtomicU64,
    entries: Mutex<HashMap<u64, AudioData>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of artifacts currently held
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<u64, AudioData>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn publish(&self, audio: AudioData) -> ArtifactHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = ArtifactHandle::new(id, audio.mime_type(), audio.size_bytes());
        self.entries().insert(id, audio);
        handle
    }

    fn revoke(&self, handle: &ArtifactHandle) -> Result<(), ArtifactError> {
        self.entries()
            .remove(&handle.id())
            .map(|_| ())
            .ok_or_else(|| ArtifactError::UnknownHandle(handle.uri()))
    }

    fn fetch(&self, handle: &ArtifactHandle) -> Option<AudioData> {
        self.entries().get(&handle.id()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::AudioMimeType;

    #[test]
    fn publish_assigns_distinct_handles() {
        let store = MemoryArtifactStore::new();
        let a = store.publish(AudioData::new(vec![1], AudioMimeType::Wav));
        let b = store.publish(AudioData::new(vec![2, 3], AudioMimeType::Webm));

        assert_ne!(a.uri(), b.uri());
        assert_eq!(b.size_bytes(), 2);
        assert_eq!(b.suggested_filename(), "recording.webm");
        assert_eq!(store.live_count(), 2);
    }

    #[test]
    fn revoke_frees_bytes_once() {
        let store = MemoryArtifactStore::new();
        let handle = store.publish(AudioData::new(vec![7; 10], AudioMimeType::Wav));
        assert_eq!(store.fetch(&handle).unwrap().data(), &[7; 10]);

        store.revoke(&handle).unwrap();
        assert!(store.fetch(&handle).is_none());
        assert!(matches!(
            store.revoke(&handle),
            Err(ArtifactError::UnknownHandle(_))
        ));
        assert_eq!(store.live_count(), 0);
    }
}
