//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, WaveformConfig, DEFAULT_FRAME_INTERVAL_MS, DEFAULT_WAVEFORM_COLUMNS,
};
