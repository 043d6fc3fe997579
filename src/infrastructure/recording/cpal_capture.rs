//! Microphone capture using cpal
//!
//! The cpal stream is not `Send`, so it lives on a dedicated thread for the
//! whole recording. The session talks to that thread through a control
//! channel and receives audio through the capture event channel.
//!
//! Container output is FLAC, reported as `audio/flac`. The whole take is
//! held in memory until the stream is finished; see [`FlacContainerEncoder`].

use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::analyser::TimeDomainAnalyser;
use super::flac_encoder::FlacContainerEncoder;
use super::framer::BlockFramer;
use crate::application::ports::{
    CaptureDevice, CaptureError, CaptureEvent, CaptureEventSender, CaptureHandle, CaptureStream,
};
use crate::domain::recording::{AudioFormat, AudioMimeType, DEFAULT_BLOCK_SIZE};
use crate::domain::waveform::DEFAULT_WINDOW;

/// Default system input device
pub struct CpalCaptureDevice {
    block_size: usize,
    window: usize,
}

impl CpalCaptureDevice {
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            window: DEFAULT_WINDOW,
        }
    }

    /// Samples per raw block
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    fn input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device().ok_or(CaptureError::NoInputDevice)
    }
}

impl Default for CpalCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureDevice for CpalCaptureDevice {
    async fn open(&self, format: AudioFormat) -> Result<CaptureHandle, CaptureError> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let analyser = Arc::new(TimeDomainAnalyser::new(self.window));

        let worker = CaptureWorker {
            format,
            block_size: self.block_size,
            analyser: Arc::clone(&analyser),
            events: events_tx,
        };

        let thread = std::thread::Builder::new()
            .name("voice-memo-capture".into())
            .spawn(move || worker.run(ready_tx, control_rx))
            .map_err(|e| CaptureError::DeviceAcquisition(e.to_string()))?;

        let sample_rate = ready_rx
            .await
            .map_err(|_| CaptureError::DeviceAcquisition("capture thread exited".into()))??;
        info!(sample_rate, %format, "microphone opened");

        let stream = CpalCaptureStream {
            control: control_tx,
            thread: Some(thread),
        };
        Ok(CaptureHandle::new(sample_rate, events_rx, Box::new(stream), analyser)
            .with_container_mime(AudioMimeType::Flac))
    }
}

enum Control {
    Pause,
    Resume,
    Finish(oneshot::Sender<Result<(), CaptureError>>),
    Close,
}

/// Where callback samples go after the analyser
enum Pipeline {
    Raw(BlockFramer),
    Container(FlacContainerEncoder),
    Finished,
}

impl Pipeline {
    fn accept(&mut self, samples: &[f32], events: &CaptureEventSender) {
        match self {
            Self::Raw(framer) => {
                for block in framer.push(samples) {
                    let _ = events.send(CaptureEvent::Samples(block));
                }
            }
            Self::Container(encoder) => encoder.push(samples),
            Self::Finished => {}
        }
    }
}

struct CaptureWorker {
    format: AudioFormat,
    block_size: usize,
    analyser: Arc<TimeDomainAnalyser>,
    events: CaptureEventSender,
}

impl CaptureWorker {
    fn run(
        self,
        ready: oneshot::Sender<Result<u32, CaptureError>>,
        control: std_mpsc::Receiver<Control>,
    ) {
        let (stream, sample_rate, pipeline) = match self.open_stream() {
            Ok(opened) => opened,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };
        if ready.send(Ok(sample_rate)).is_err() {
            return;
        }

        while let Ok(command) = control.recv() {
            match command {
                Control::Pause => Self::with_pipeline(&pipeline, |p| {
                    if let Pipeline::Container(encoder) = p {
                        encoder.pause();
                    }
                }),
                Control::Resume => Self::with_pipeline(&pipeline, |p| {
                    if let Pipeline::Container(encoder) = p {
                        encoder.resume();
                    }
                }),
                Control::Finish(reply) => {
                    let result = self.finish(&pipeline);
                    let _ = reply.send(result);
                }
                Control::Close => break,
            }
        }

        if let Err(e) = stream.pause() {
            debug!(error = %e, "stream pause before release failed");
        }
        drop(stream);
        debug!("microphone released");
    }

    fn open_stream(&self) -> Result<(cpal::Stream, u32, Arc<Mutex<Pipeline>>), CaptureError> {
        let device = CpalCaptureDevice::input_device()?;
        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceAcquisition(e.to_string()))?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.config();
        let sample_rate = config.sample_rate.0;

        let pipeline = Arc::new(Mutex::new(match self.format {
            AudioFormat::RawPcm => Pipeline::Raw(BlockFramer::new(self.block_size)),
            AudioFormat::ContainerEncoded => {
                Pipeline::Container(FlacContainerEncoder::new(sample_rate))
            }
        }));

        let stream = match sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(&device, &config, &pipeline),
            SampleFormat::I16 => self.build_stream::<i16>(&device, &config, &pipeline),
            SampleFormat::U16 => self.build_stream::<u16>(&device, &config, &pipeline),
            other => {
                return Err(CaptureError::DeviceAcquisition(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        }
        .map_err(|e| CaptureError::DeviceAcquisition(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::DeviceAcquisition(e.to_string()))?;

        Ok((stream, sample_rate, pipeline))
    }

    fn build_stream<T>(
        &self,
        device: &cpal::Device,
        config: &StreamConfig,
        pipeline: &Arc<Mutex<Pipeline>>,
    ) -> Result<cpal::Stream, cpal::BuildStreamError>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = usize::from(config.channels);
        let analyser = Arc::clone(&self.analyser);
        let pipeline = Arc::clone(pipeline);
        let events = self.events.clone();

        device.build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mono = downmix(data, channels);
                analyser.push(&mono);
                if let Ok(mut pipeline) = pipeline.lock() {
                    pipeline.accept(&mono, &events);
                }
            },
            |err| warn!(error = %err, "audio stream error"),
            None,
        )
    }

    fn with_pipeline(pipeline: &Mutex<Pipeline>, f: impl FnOnce(&mut Pipeline)) {
        let mut guard = pipeline.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }

    /// Stop feeding the pipeline and emit whatever it still holds
    fn finish(&self, pipeline: &Mutex<Pipeline>) -> Result<(), CaptureError> {
        let previous = {
            let mut guard = pipeline.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *guard, Pipeline::Finished)
        };

        let result = match previous {
            Pipeline::Container(mut encoder) => {
                debug!(samples = encoder.buffered(), "flushing container encoder");
                match encoder.flush() {
                    Ok(chunks) => {
                        for chunk in chunks {
                            let _ = self.events.send(CaptureEvent::Chunk(chunk));
                        }
                        Ok(())
                    }
                    Err(e) => Err(CaptureError::Encoding(e.to_string())),
                }
            }
            Pipeline::Raw(framer) => {
                debug!(discarded = framer.pending(), "dropping partial block");
                Ok(())
            }
            Pipeline::Finished => Ok(()),
        };

        let _ = self.events.send(CaptureEvent::Finished);
        result
    }
}

/// Control handle for the capture thread
struct CpalCaptureStream {
    control: std_mpsc::Sender<Control>,
    thread: Option<JoinHandle<()>>,
}

impl CpalCaptureStream {
    fn send(&self, command: Control) -> Result<(), CaptureError> {
        self.control
            .send(command)
            .map_err(|_| CaptureError::StreamFailed("capture thread exited".into()))
    }
}

#[async_trait]
impl CaptureStream for CpalCaptureStream {
    fn pause(&mut self) -> Result<(), CaptureError> {
        self.send(Control::Pause)
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        self.send(Control::Resume)
    }

    async fn finish(&mut self) -> Result<(), CaptureError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Control::Finish(reply_tx))?;
        reply_rx
            .await
            .map_err(|_| CaptureError::StreamFailed("capture thread exited".into()))?
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        // A thread that already exited has dropped its receiver; joining is enough.
        let _ = self.control.send(Control::Close);
        join_worker(thread).map_err(|_| CaptureError::Teardown("capture thread panicked".into()))
    }
}

/// Join the capture thread without stalling other tasks on a worker thread
fn join_worker(thread: JoinHandle<()>) -> std::thread::Result<()> {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| thread.join())
        }
        _ => thread.join(),
    }
}

impl Drop for CpalCaptureStream {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.control.send(Control::Close);
        }
    }
}

/// Average interleaved frames down to one channel
fn downmix<T>(data: &[T], channels: usize) -> Vec<f32>
where
    T: Sample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    data.chunks(channels)
        .map(|frame| {
            let sum: f32 = frame.iter().map(|&s| s.to_sample::<f32>()).sum();
            sum / frame.len() as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_single_channel() {
        let mono = vec![0.1f32, -0.2, 0.3];
        assert_eq!(downmix(&mono, 1), mono);
    }

    #[test]
    fn downmix_two_channels() {
        let stereo = vec![0.5f32, 0.25, -1.0, 1.0];
        assert_eq!(downmix(&stereo, 2), vec![0.375, 0.0]);
    }

    #[test]
    fn downmix_integer_samples() {
        let mono = downmix(&[0i16, i16::MIN], 1);
        assert_eq!(mono, vec![0.0, -1.0]);
    }

    #[test]
    fn finish_flushes_container_then_marks_done() {
        let (events, mut rx) = mpsc::unbounded_channel();
        let worker = CaptureWorker {
            format: AudioFormat::ContainerEncoded,
            block_size: 4,
            analyser: Arc::new(TimeDomainAnalyser::new(8)),
            events: events.clone(),
        };
        let pipeline = Mutex::new(Pipeline::Container(FlacContainerEncoder::new(16_000)));
        feed(&pipeline, &[0.25; 1600], &events);

        worker.finish(&pipeline).unwrap();
        assert!(matches!(rx.try_recv(), Ok(CaptureEvent::Chunk(_))));
        assert_eq!(rx.try_recv().ok(), Some(CaptureEvent::Finished));
    }

    #[test]
    fn raw_pipeline_emits_full_blocks() {
        let (events, mut rx) = mpsc::unbounded_channel();
        let pipeline = Mutex::new(Pipeline::Raw(BlockFramer::new(4)));
        feed(&pipeline, &[0.5; 10], &events);

        assert!(matches!(rx.try_recv(), Ok(CaptureEvent::Samples(b)) if b.len() == 4));
        assert!(matches!(rx.try_recv(), Ok(CaptureEvent::Samples(_))));
        assert!(rx.try_recv().is_err());
    }

    fn feed(pipeline: &Mutex<Pipeline>, samples: &[f32], events: &CaptureEventSender) {
        pipeline.lock().unwrap().accept(samples, events);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn join_worker_on_multi_thread_runtime() {
        let thread = std::thread::spawn(|| std::thread::sleep(std::time::Duration::from_millis(20)));
        assert!(join_worker(thread).is_ok());
    }

    #[tokio::test]
    async fn join_worker_on_current_thread_runtime() {
        let thread = std::thread::spawn(|| {});
        assert!(join_worker(thread).is_ok());
    }

    #[test]
    fn join_worker_reports_panic() {
        let thread = std::thread::spawn(|| panic!("capture failed"));
        assert!(join_worker(thread).is_err());
    }

    #[tokio::test]
    #[ignore = "requires a microphone"]
    async fn opens_default_microphone() {
        let device = CpalCaptureDevice::new();
        let mut handle = device.open(AudioFormat::RawPcm).await.unwrap();
        assert!(handle.sample_rate > 0);
        handle.stream.finish().await.unwrap();
        handle.stream.close().unwrap();
    }
}
