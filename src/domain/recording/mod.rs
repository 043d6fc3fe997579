//! Recording domain module

mod accumulator;
mod audio_data;
mod duration;
mod format;
mod sample_block;
pub mod wav;

pub use accumulator::PcmAccumulator;
pub use audio_data::{AudioData, AudioMimeType};
pub use duration::{Duration, DEFAULT_MAX_DURATION_SECS};
pub use format::AudioFormat;
pub use sample_block::{concat_chunks, ContainerChunk, SampleBlock, DEFAULT_BLOCK_SIZE};
pub use wav::encode_wav;
