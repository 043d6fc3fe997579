//! voice-memo - microphone voice memo recorder
//!
//! Records from the default input device into either a compressed
//! container stream or a 16-bit mono WAV file, with pause/resume, a live
//! waveform and an elapsed-time clock.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Recording state machine, sample blocks, WAV encoding, waveform geometry, config
//! - **Application**: Session controller, elapsed timer, waveform loop and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, FLAC, rodio, XDG config, etc.)
//! - **CLI**: Command-line interface, argument parsing, stdin commands and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
