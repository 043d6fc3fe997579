//! WAV output conformance

use std::io::Cursor;

use voice_memo::domain::recording::wav::WAV_HEADER_SIZE;
use voice_memo::domain::recording::{encode_wav, SampleBlock};

const N: usize = 512;
const RATE: u32 = 48_000;

fn three_blocks() -> Vec<SampleBlock> {
    vec![
        SampleBlock::new(vec![0.0; N]),
        SampleBlock::new(vec![1.0; N]),
        SampleBlock::new(vec![-1.0; N]),
    ]
}

#[test]
fn header_fields_are_exact() {
    let wav = encode_wav(&three_blocks(), RATE);
    let bytes = wav.data();

    assert_eq!(bytes.len(), WAV_HEADER_SIZE + 6 * N);
    assert_eq!(&bytes[40..44], &((6 * N) as u32).to_le_bytes());
    assert_eq!(&bytes[4..8], &((36 + 6 * N) as u32).to_le_bytes());
    assert_eq!(&bytes[28..32], &96_000u32.to_le_bytes());
}

#[test]
fn pcm_payload_is_exact() {
    let wav = encode_wav(&three_blocks(), RATE);
    let payload = &wav.data()[WAV_HEADER_SIZE..];

    let (zeros, rest) = payload.split_at(2 * N);
    let (highs, lows) = rest.split_at(2 * N);
    assert!(zeros.chunks_exact(2).all(|s| s == [0x00, 0x00]));
    assert!(highs.chunks_exact(2).all(|s| s == [0xFF, 0x7F]));
    assert!(lows.chunks_exact(2).all(|s| s == [0x00, 0x80]));
}

#[test]
fn hound_reads_what_we_write() {
    let wav = encode_wav(&three_blocks(), RATE);
    let reader = hound::WavReader::new(Cursor::new(wav.into_data())).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.len() as usize, 3 * N);

    let samples: Vec<i16> = reader.into_samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples[0], 0);
    assert_eq!(samples[N], i16::MAX);
    assert_eq!(samples[2 * N], i16::MIN);
}
