//! Waveform drawing adapters

mod sparkline;

pub use sparkline::{NoOpWaveformSink, SparklineSink};
