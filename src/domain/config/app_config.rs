//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DurationParseError, FormatParseError};
use crate::domain::recording::{AudioFormat, Duration, DEFAULT_BLOCK_SIZE};

/// Default sparkline width, in terminal columns
pub const DEFAULT_WAVEFORM_COLUMNS: usize = 48;

/// Default waveform frame interval (roughly one display refresh)
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Live waveform settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveformConfig {
    pub enabled: Option<bool>,
    pub columns: Option<usize>,
    pub frame_interval_ms: Option<u64>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub format: Option<String>,
    pub output_dir: Option<String>,
    pub max_duration: Option<String>,
    pub block_size: Option<usize>,
    pub waveform: Option<WaveformConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            format: Some(AudioFormat::default().to_string()),
            output_dir: Some(".".to_string()),
            max_duration: Some(Duration::default_max_duration().to_string()),
            block_size: Some(DEFAULT_BLOCK_SIZE),
            waveform: Some(WaveformConfig {
                enabled: Some(true),
                columns: Some(DEFAULT_WAVEFORM_COLUMNS),
                frame_interval_ms: Some(DEFAULT_FRAME_INTERVAL_MS),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            format: other.format.or(self.format),
            output_dir: other.output_dir.or(self.output_dir),
            max_duration: other.max_duration.or(self.max_duration),
            block_size: other.block_size.or(self.block_size),
            waveform: Self::merge_waveform_config(self.waveform, other.waveform),
        }
    }

    fn merge_waveform_config(
        base: Option<WaveformConfig>,
        other: Option<WaveformConfig>,
    ) -> Option<WaveformConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(WaveformConfig {
                enabled: o.enabled.or(b.enabled),
                columns: o.columns.or(b.columns),
                frame_interval_ms: o.frame_interval_ms.or(b.frame_interval_ms),
            }),
        }
    }

    /// Parse the configured format. Unset means the default format.
    pub fn parsed_format(&self) -> Result<AudioFormat, FormatParseError> {
        self.format
            .as_deref()
            .map_or(Ok(AudioFormat::default()), str::parse::<AudioFormat>)
    }

    /// Get output directory, or the current directory if not set
    pub fn output_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.output_dir.as_deref().unwrap_or("."))
    }

    /// Parse the configured max duration. Unset means the default limit.
    pub fn parsed_max_duration(&self) -> Result<Duration, DurationParseError> {
        self.max_duration
            .as_deref()
            .map_or_else(|| Ok(Duration::default_max_duration()), str::parse::<Duration>)
    }

    /// Get raw capture block size, or 4096 if not set or zero
    pub fn block_size_or_default(&self) -> usize {
        self.block_size
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_BLOCK_SIZE)
    }

    pub fn waveform_enabled_or_default(&self) -> bool {
        self.waveform
            .as_ref()
            .and_then(|w| w.enabled)
            .unwrap_or(true)
    }

    pub fn waveform_columns_or_default(&self) -> usize {
        self.waveform
            .as_ref()
            .and_then(|w| w.columns)
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_WAVEFORM_COLUMNS)
    }

    pub fn frame_interval_or_default(&self) -> std::time::Duration {
        let ms = self
            .waveform
            .as_ref()
            .and_then(|w| w.frame_interval_ms)
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_FRAME_INTERVAL_MS);
        std::time::Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.format, Some("webm".to_string()));
        assert_eq!(config.output_dir, Some(".".to_string()));
        assert_eq!(config.max_duration, Some("30m".to_string()));
        assert_eq!(config.block_size, Some(4096));
        let waveform = config.waveform.as_ref().unwrap();
        assert_eq!(waveform.enabled, Some(true));
        assert_eq!(waveform.columns, Some(48));
        assert_eq!(waveform.frame_interval_ms, Some(16));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.format.is_none());
        assert!(config.output_dir.is_none());
        assert!(config.block_size.is_none());
        assert!(config.waveform.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            format: Some("webm".to_string()),
            output_dir: Some("/tmp".to_string()),
            ..Default::default()
        };
        let other = AppConfig {
            format: Some("wav".to_string()),
            output_dir: None,
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.format, Some("wav".to_string()));
        assert_eq!(merged.output_dir, Some("/tmp".to_string()));
    }

    #[test]
    fn merge_waveform_sections_field_by_field() {
        let base = AppConfig::defaults();
        let other = AppConfig {
            waveform: Some(WaveformConfig {
                enabled: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert!(!merged.waveform_enabled_or_default());
        assert_eq!(merged.waveform_columns_or_default(), 48);
    }

    #[test]
    fn invalid_values_are_reported() {
        let config = AppConfig {
            format: Some("mp3".to_string()),
            max_duration: Some("soon".to_string()),
            block_size: Some(0),
            ..Default::default()
        };
        assert_eq!(config.parsed_format().unwrap_err().input, "mp3");
        assert_eq!(config.parsed_max_duration().unwrap_err().input, "soon");
        assert_eq!(config.block_size_or_default(), 4096);
    }

    #[test]
    fn unset_values_use_defaults() {
        let config = AppConfig::empty();
        assert_eq!(config.parsed_format().unwrap(), AudioFormat::ContainerEncoded);
        assert_eq!(
            config.parsed_max_duration().unwrap(),
            Duration::default_max_duration()
        );
    }

    #[test]
    fn accessors_read_set_values() {
        let config = AppConfig {
            format: Some("wav".to_string()),
            max_duration: Some("2m".to_string()),
            block_size: Some(1024),
            ..Default::default()
        };
        assert_eq!(config.parsed_format().unwrap(), AudioFormat::RawPcm);
        assert_eq!(config.parsed_max_duration().unwrap().as_secs(), 120);
        assert_eq!(config.block_size_or_default(), 1024);
    }
}
