//! Interactive line commands read from stdin

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::error::FormatParseError;
use crate::domain::recording::AudioFormat;

/// One user request to the running session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Pause,
    Resume,
    Stop,
    Clear,
    ReRecord,
    Format(AudioFormat),
    /// Write the artifact to the given path, or the output directory
    Save(Option<PathBuf>),
    Play,
    Status,
    Help,
    Quit,
}

/// Errors when parsing a command line
#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("Unknown command: \"{0}\". Type 'help' for a list of commands")]
    Unknown(String),

    #[error("Missing argument for '{0}'")]
    MissingArgument(&'static str),

    #[error(transparent)]
    InvalidFormat(#[from] FormatParseError),
}

/// Lines shown by `help`
pub const HELP_LINES: &[(&str, &str)] = &[
    ("start", "begin a new recording"),
    ("pause", "pause the current recording"),
    ("resume", "continue a paused recording"),
    ("stop", "finish the recording"),
    ("clear", "discard the finished recording"),
    ("rerecord", "discard and start over"),
    ("format <webm|wav>", "choose the output format (while idle)"),
    ("save [path]", "write the recording to disk"),
    ("play", "listen to the recording"),
    ("status", "show the current state"),
    ("quit", "exit"),
];

impl FromStr for SessionCommand {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

        let command = match name.as_str() {
            "start" | "record" => Self::Start,
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "stop" => Self::Stop,
            "clear" => Self::Clear,
            "rerecord" | "re-record" => Self::ReRecord,
            "format" => {
                let value = arg.ok_or(CommandParseError::MissingArgument("format"))?;
                Self::Format(value.parse()?)
            }
            "save" => Self::Save(arg.map(PathBuf::from)),
            "play" => Self::Play,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return Err(CommandParseError::Unknown(line.trim().to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!("start".parse::<SessionCommand>().unwrap(), SessionCommand::Start);
        assert_eq!("  PAUSE ".parse::<SessionCommand>().unwrap(), SessionCommand::Pause);
        assert_eq!("re-record".parse::<SessionCommand>().unwrap(), SessionCommand::ReRecord);
        assert_eq!("q".parse::<SessionCommand>().unwrap(), SessionCommand::Quit);
    }

    #[test]
    fn parses_format_argument() {
        assert_eq!(
            "format wav".parse::<SessionCommand>().unwrap(),
            SessionCommand::Format(AudioFormat::RawPcm)
        );
        assert!(matches!(
            "format".parse::<SessionCommand>(),
            Err(CommandParseError::MissingArgument("format"))
        ));
        assert!(matches!(
            "format mp3".parse::<SessionCommand>(),
            Err(CommandParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn save_path_is_optional() {
        assert_eq!("save".parse::<SessionCommand>().unwrap(), SessionCommand::Save(None));
        assert_eq!(
            "save /tmp/my memo.wav".parse::<SessionCommand>().unwrap(),
            SessionCommand::Save(Some(PathBuf::from("/tmp/my memo.wav")))
        );
    }

    #[test]
    fn rejects_unknown_commands() {
        let err = "dance".parse::<SessionCommand>().unwrap_err();
        assert!(err.to_string().contains("dance"));
    }
}
