//! Mono 16-bit PCM WAV assembly
//!
//! Produces a canonical 44-byte RIFF header followed by little-endian
//! `i16` samples. Float samples are clamped, scaled asymmetrically
//! (`x32768` below zero, `x32767` otherwise) and truncated toward zero so
//! output stays bit-identical with recordings made by earlier versions.

use super::audio_data::{AudioData, AudioMimeType};
use super::sample_block::SampleBlock;

/// Size of the RIFF/WAVE header in bytes
pub const WAV_HEADER_SIZE: usize = 44;

/// Channel count written to the header
pub const WAV_CHANNELS: u16 = 1;

/// Bit depth written to the header
pub const WAV_BITS_PER_SAMPLE: u16 = 16;

const BYTES_PER_SAMPLE: u32 = (WAV_BITS_PER_SAMPLE / 8) as u32;

/// Largest payload whose RIFF size (`36 + data_size`) still fits in 32 bits,
/// rounded down to a whole sample
pub const MAX_WAV_DATA_SIZE: u32 = (u32::MAX - 36) / BYTES_PER_SAMPLE * BYTES_PER_SAMPLE;

/// Convert one float sample to a signed 16-bit value.
///
/// NaN maps to 0.
pub fn sample_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Build the 44-byte header for `data_size` bytes of mono 16-bit PCM.
///
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16
/// [20-21]  1 (PCM)
/// [22-23]  1 channel
/// [24-27]  sample_rate
/// [28-31]  sample_rate * 2
/// [32-33]  2
/// [34-35]  16
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn wav_header(sample_rate: u32, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let block_align = WAV_CHANNELS * WAV_BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate.wrapping_mul(u32::from(block_align));

    let mut header = [0u8; WAV_HEADER_SIZE];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&36u32.saturating_add(data_size).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&WAV_CHANNELS.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&WAV_BITS_PER_SAMPLE.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Encode ordered sample blocks as a complete WAV file.
///
/// Blocks are concatenated in the order given. The result is tagged
/// `audio/wav`. Samples past [`MAX_WAV_DATA_SIZE`] are left out so the
/// header always describes the payload exactly.
pub fn encode_wav(blocks: &[SampleBlock], sample_rate: u32) -> AudioData {
    let sample_count: usize = blocks.iter().map(SampleBlock::len).sum();
    let data_size = data_size_for(sample_count);
    let kept = (data_size / BYTES_PER_SAMPLE) as usize;

    let mut bytes = Vec::with_capacity(WAV_HEADER_SIZE + data_size as usize);
    bytes.extend_from_slice(&wav_header(sample_rate, data_size));
    for sample in blocks.iter().flat_map(|b| b.samples().iter()).take(kept) {
        bytes.extend_from_slice(&sample_to_i16(*sample).to_le_bytes());
    }

    AudioData::new(bytes, AudioMimeType::Wav)
}

/// Payload size for `sample_count` samples, capped at [`MAX_WAV_DATA_SIZE`]
fn data_size_for(sample_count: usize) -> u32 {
    u32::try_from(sample_count)
        .ok()
        .and_then(|n| n.checked_mul(BYTES_PER_SAMPLE))
        .map_or(MAX_WAV_DATA_SIZE, |size| size.min(MAX_WAV_DATA_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn conversion_extremes() {
        assert_eq!(sample_to_i16(0.0), 0);
        assert_eq!(sample_to_i16(1.0), 0x7FFF);
        assert_eq!(sample_to_i16(-1.0), i16::MIN);
    }

    #[test]
    fn conversion_clamps_out_of_range() {
        assert_eq!(sample_to_i16(3.5), 0x7FFF);
        assert_eq!(sample_to_i16(-7.0), i16::MIN);
        assert_eq!(sample_to_i16(f32::NAN), 0);
    }

    #[test]
    fn conversion_truncates_toward_zero() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(sample_to_i16(0.5), 16383);
        // -0.5 * 32768 = -16384 exactly
        assert_eq!(sample_to_i16(-0.5), -16384);
        // -0.00002 * 32768 = -0.65536
        assert_eq!(sample_to_i16(-0.00002), 0);
    }

    #[test]
    fn header_layout() {
        let header = wav_header(44_100, 200);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(u32_at(&header, 4), 236);
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(u32_at(&header, 16), 16);
        assert_eq!(u16_at(&header, 20), 1);
        assert_eq!(u16_at(&header, 22), 1);
        assert_eq!(u32_at(&header, 24), 44_100);
        assert_eq!(u32_at(&header, 28), 88_200);
        assert_eq!(u16_at(&header, 32), 2);
        assert_eq!(u16_at(&header, 34), 16);
        assert_eq!(&header[36..40], b"data");
        assert_eq!(u32_at(&header, 40), 200);
    }

    #[test]
    fn oversized_payload_is_capped_consistently() {
        assert_eq!(data_size_for(3), 6);
        assert_eq!(data_size_for(usize::MAX), MAX_WAV_DATA_SIZE);
        assert_eq!(data_size_for(3_000_000_000), MAX_WAV_DATA_SIZE);
        assert_eq!(MAX_WAV_DATA_SIZE % 2, 0);

        let header = wav_header(48_000, data_size_for(3_000_000_000));
        assert_eq!(u32_at(&header, 40), MAX_WAV_DATA_SIZE);
        assert_eq!(u32_at(&header, 4), 36 + MAX_WAV_DATA_SIZE);
    }

    #[test]
    fn riff_size_saturates_instead_of_wrapping() {
        let header = wav_header(48_000, u32::MAX);
        assert_eq!(u32_at(&header, 4), u32::MAX);
    }

    #[test]
    fn empty_recording_is_header_only() {
        let wav = encode_wav(&[], 48_000);
        assert_eq!(wav.size_bytes(), WAV_HEADER_SIZE);
        assert_eq!(u32_at(wav.data(), 40), 0);
        assert_eq!(u32_at(wav.data(), 4), 36);
        assert_eq!(wav.mime_type(), AudioMimeType::Wav);
    }

    #[test]
    fn blocks_are_written_in_order() {
        let blocks = vec![
            SampleBlock::new(vec![1.0]),
            SampleBlock::new(vec![-1.0]),
            SampleBlock::new(vec![0.0]),
        ];
        let wav = encode_wav(&blocks, 8000);
        assert_eq!(&wav.data()[44..], &[0xFF, 0x7F, 0x00, 0x80, 0x00, 0x00]);
    }
}
