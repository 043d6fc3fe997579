//! CLI argument definitions using Clap

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::recording::{AudioFormat, Duration};

/// voice-memo - record short voice memos from the microphone
#[derive(Parser, Debug)]
#[command(name = "voice-memo")]
#[command(version)]
#[command(about = "Record voice memos from the microphone with a live waveform")]
#[command(long_about = None)]
pub struct Cli {
    /// Output format (webm: compressed container, wav: raw 16-bit PCM)
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<FormatArg>,

    /// Directory recordings are saved to
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Stop a recording automatically after this long (e.g., 90s, 5m)
    #[arg(short = 'm', long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Do not draw the live waveform
    #[arg(long)]
    pub no_waveform: bool,

    /// Start recording immediately
    #[arg(short = 's', long)]
    pub start: bool,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Format argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Webm,
    Wav,
}

impl From<FormatArg> for AudioFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Webm => AudioFormat::ContainerEncoded,
            FormatArg::Wav => AudioFormat::RawPcm,
        }
    }
}

impl From<AudioFormat> for FormatArg {
    fn from(format: AudioFormat) -> Self {
        match format {
            AudioFormat::ContainerEncoded => FormatArg::Webm,
            AudioFormat::RawPcm => FormatArg::Wav,
        }
    }
}

/// Resolved options for an interactive session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub format: AudioFormat,
    pub output_dir: PathBuf,
    pub max_duration: Duration,
    pub block_size: usize,
    pub waveform: bool,
    pub waveform_columns: usize,
    pub frame_interval: StdDuration,
    pub start_immediately: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "format",
    "output_dir",
    "max_duration",
    "block_size",
    "waveform.enabled",
    "waveform.columns",
    "waveform.frame_interval_ms",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
