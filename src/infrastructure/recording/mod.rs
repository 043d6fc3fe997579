//! Recording infrastructure module
//!
//! Microphone capture through cpal, plus a scripted device for running
//! without hardware. Container recordings are encoded to FLAC.

mod analyser;
mod cpal_capture;
mod flac_encoder;
mod framer;
mod scripted;

pub use analyser::TimeDomainAnalyser;
pub use cpal_capture::CpalCaptureDevice;
pub use flac_encoder::{encode_to_flac, EncodingError, FlacContainerEncoder};
pub use framer::BlockFramer;
pub use scripted::{ScriptedCaptureDevice, ScriptedFeed, ScriptedLog};

/// Create the default capture device for the current platform
pub fn create_capture_device(block_size: usize) -> CpalCaptureDevice {
    CpalCaptureDevice::new().with_block_size(block_size)
}
