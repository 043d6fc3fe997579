//! Recording session scenarios driven by a scripted capture device

use std::sync::Arc;
use std::time::Duration;

use voice_memo::application::ports::ArtifactStore;
use voice_memo::application::{SessionController, SessionError, SessionSettings};
use voice_memo::domain::recording::{AudioFormat, AudioMimeType};
use voice_memo::domain::session::RecordingPhase;
use voice_memo::infrastructure::recording::{ScriptedCaptureDevice, ScriptedFeed};
use voice_memo::infrastructure::{MemoryArtifactStore, NoOpWaveformSink};

const BLOCK: usize = 4096;

fn new_session(
    format: AudioFormat,
) -> (
    SessionController<ScriptedCaptureDevice, MemoryArtifactStore>,
    ScriptedFeed,
) {
    let (device, feed) = ScriptedCaptureDevice::new(48_000);
    let settings = SessionSettings {
        format,
        ..Default::default()
    };
    let session = SessionController::new(
        device,
        MemoryArtifactStore::new(),
        Arc::new(NoOpWaveformSink),
        settings,
    );
    (session, feed)
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[tokio::test]
async fn pause_resume_end_to_end() {
    let (mut session, feed) = new_session(AudioFormat::RawPcm);

    session.start().await.unwrap();
    feed.deliver_samples(vec![0.1; BLOCK]);
    feed.deliver_samples(vec![0.2; BLOCK]);
    session.pause().unwrap();
    feed.deliver_samples(vec![0.9; BLOCK]);
    session.resume().unwrap();
    feed.deliver_samples(vec![0.3; BLOCK]);
    session.pump();
    assert_eq!(session.snapshot().captured_samples, 3 * BLOCK);

    let handle = session.stop().await.unwrap();
    assert_eq!(session.phase(), RecordingPhase::Idle);
    assert_eq!(handle.mime_type(), AudioMimeType::Wav);
    assert_eq!(handle.suggested_filename(), "recording.wav");

    let wav = session.artifact_data().unwrap();
    let bytes = wav.data();
    assert_eq!(bytes.len(), 44 + 2 * 3 * BLOCK);
    assert_eq!(u32_at(bytes, 40) as usize, 2 * 3 * BLOCK);
    assert_eq!(u32_at(bytes, 24), 48_000);

    // The paused block (0.9) never reaches the file.
    let paused = 0.9f32 * 32767.0;
    let samples: Vec<i16> = bytes[44..]
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    assert!(samples.iter().all(|&s| s != paused as i16));
    assert_eq!(samples[2 * BLOCK], (0.3f32 * 32767.0) as i16);
}

#[tokio::test]
async fn container_chunks_concatenate_in_order() {
    let (mut session, feed) = new_session(AudioFormat::ContainerEncoded);

    session.start().await.unwrap();
    feed.deliver_chunk(vec![0x1a, 0x45]);
    feed.deliver_chunk(vec![0xdf]);
    feed.deliver_chunk(Vec::new());
    feed.set_final_chunk(vec![0xa3]);

    let handle = session.stop().await.unwrap();
    assert_eq!(handle.mime_type(), AudioMimeType::Webm);
    assert_eq!(handle.suggested_filename(), "recording.webm");
    assert_eq!(
        session.artifact_data().unwrap().data(),
        &[0x1a, 0x45, 0xdf, 0xa3]
    );
}

#[tokio::test]
async fn re_record_releases_previous_artifact() {
    let (mut session, feed) = new_session(AudioFormat::RawPcm);

    session.start().await.unwrap();
    feed.deliver_samples(vec![0.5; BLOCK]);
    tokio::time::sleep(Duration::from_millis(20)).await;
    let first = session.stop().await.unwrap();
    assert!(session.elapsed_ms() > 0);

    session.re_record().await.unwrap();
    assert_eq!(session.phase(), RecordingPhase::Recording);
    assert_eq!(session.elapsed_ms(), 0);
    assert!(session.artifact().is_none());
    assert!(session.artifacts().fetch(&first).is_none());
    assert_eq!(session.artifacts().live_count(), 0);
    assert_eq!(session.snapshot().captured_samples, 0);

    feed.deliver_samples(vec![0.25; BLOCK]);
    let second = session.stop().await.unwrap();
    assert_ne!(first.uri(), second.uri());
    assert_eq!(session.artifacts().live_count(), 1);
}

#[tokio::test]
async fn re_record_without_artifact_is_rejected() {
    let (mut session, feed) = new_session(AudioFormat::RawPcm);
    assert!(matches!(
        session.re_record().await,
        Err(SessionError::NoArtifact)
    ));
    assert_eq!(feed.open_count(), 0);
}

#[tokio::test]
async fn denied_device_keeps_idle() {
    let (mut session, feed) = new_session(AudioFormat::ContainerEncoded);
    feed.deny_access("NotAllowedError: Permission denied");

    assert!(session.start().await.is_err());
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, RecordingPhase::Idle);
    assert!(snapshot
        .error_message
        .unwrap()
        .contains("NotAllowedError"));
    assert!(snapshot.artifact.is_none());
}

#[tokio::test]
async fn phase_edges() {
    let (mut session, _feed) = new_session(AudioFormat::RawPcm);

    assert!(session.resume().is_err());
    session.start().await.unwrap();
    assert!(session.resume().is_err());
    assert_eq!(session.phase(), RecordingPhase::Recording);

    session.pause().unwrap();
    assert!(session.pause().is_err());
    assert_eq!(session.phase(), RecordingPhase::Paused);

    // Stop is allowed straight from Paused.
    session.stop().await.unwrap();
    assert_eq!(session.phase(), RecordingPhase::Idle);
    assert!(session.pause().is_err());
}

#[tokio::test(start_paused = true)]
async fn elapsed_holds_while_paused() {
    let (mut session, _feed) = new_session(AudioFormat::RawPcm);

    session.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(125)).await;
    session.pause().unwrap();
    let held = session.snapshot();
    assert_eq!(held.elapsed_label, "02:05");

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(session.snapshot().elapsed_ms, held.elapsed_ms);

    session.resume().unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    session.stop().await.unwrap();
    assert_eq!(session.snapshot().elapsed_label, "02:10");
}
