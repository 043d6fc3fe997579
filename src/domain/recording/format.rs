//! Recording format selection

use std::fmt;
use std::str::FromStr;

use super::audio_data::AudioMimeType;
use crate::domain::error::FormatParseError;

/// Output format of a recording session.
///
/// Frozen once the session leaves the idle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioFormat {
    /// Compressed stream produced incrementally by the capture device's encoder
    #[default]
    ContainerEncoded,
    /// Raw float blocks accumulated in memory and assembled into a WAV file on stop
    RawPcm,
}

impl AudioFormat {
    /// All selectable formats
    pub const ALL: [AudioFormat; 2] = [AudioFormat::ContainerEncoded, AudioFormat::RawPcm];

    /// Short user-facing name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ContainerEncoded => "webm",
            Self::RawPcm => "wav",
        }
    }

    /// MIME type an artifact of this format carries by contract
    pub const fn mime_type(&self) -> AudioMimeType {
        match self {
            Self::ContainerEncoded => AudioMimeType::Webm,
            Self::RawPcm => AudioMimeType::Wav,
        }
    }

    /// File extension for this format
    pub const fn extension(&self) -> &'static str {
        self.mime_type().extension()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "webm" | "container" => Ok(Self::ContainerEncoded),
            "wav" | "pcm" => Ok(Self::RawPcm),
            _ => Err(FormatParseError {
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_formats() {
        assert_eq!("webm".parse::<AudioFormat>().unwrap(), AudioFormat::ContainerEncoded);
        assert_eq!("WAV".parse::<AudioFormat>().unwrap(), AudioFormat::RawPcm);
        assert_eq!(" pcm ".parse::<AudioFormat>().unwrap(), AudioFormat::RawPcm);
    }

    #[test]
    fn parse_unknown_format_fails() {
        let err = "mp3".parse::<AudioFormat>().unwrap_err();
        assert!(err.to_string().contains("mp3"));
    }

    #[test]
    fn mime_and_extension() {
        assert_eq!(AudioFormat::ContainerEncoded.mime_type().as_str(), "audio/webm");
        assert_eq!(AudioFormat::RawPcm.mime_type().as_str(), "audio/wav");
        assert_eq!(AudioFormat::ContainerEncoded.extension(), "webm");
        assert_eq!(AudioFormat::RawPcm.extension(), "wav");
    }

    #[test]
    fn default_is_container() {
        assert_eq!(AudioFormat::default(), AudioFormat::ContainerEncoded);
    }

    #[test]
    fn display_round_trips() {
        for format in AudioFormat::ALL {
            assert_eq!(format.to_string().parse::<AudioFormat>().unwrap(), format);
        }
    }
}
