//! Immutable run settings and the parse-and-validate functions behind each
//! interactive prompt. Every parser maps blank input to its default and
//! returns a recoverable [`InvalidInput`] kind otherwise, so the prompt
//! loop can re-ask without any state of its own.

use thiserror::Error;

pub const DEFAULT_RATE: u16 = 170;
pub const MIN_RATE: u16 = 80;
pub const MAX_RATE: u16 = 350;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("Invalid choice. Try again.")]
    VoiceChoice,
    #[error("Invalid rate. Enter a number between 80 and 350 (or press Enter).")]
    Rate,
    #[error("Invalid mode. Choose S, R, or B.")]
    Mode,
    #[error("Invalid choice. Choose wav or mp3.")]
    Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Speak,
    Record,
    Both,
}

impl Mode {
    pub fn speaks(self) -> bool {
        matches!(self, Mode::Speak | Mode::Both)
    }

    pub fn records(self) -> bool {
        matches!(self, Mode::Record | Mode::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Wav,
    Mp3,
}

/// Settings for one run, collected up front so playback is never
/// interrupted by further prompts. `save_format` is only meaningful when
/// the mode records; it stays at the wav default otherwise.
#[derive(Debug, Clone)]
pub struct TtsSettings {
    pub voice_id: Option<String>,
    pub rate: u16,
    pub mode: Mode,
    pub save_format: SaveFormat,
}

/// Blank selects the default voice; a number selects from the listed
/// voices by index.
pub fn parse_voice_choice(input: &str, voice_count: usize) -> Result<Option<usize>, InvalidInput> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let index: usize = input.parse().map_err(|_| InvalidInput::VoiceChoice)?;
    if index < voice_count {
        Ok(Some(index))
    } else {
        Err(InvalidInput::VoiceChoice)
    }
}

pub fn parse_rate(input: &str) -> Result<u16, InvalidInput> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(DEFAULT_RATE);
    }
    let rate: u16 = input.parse().map_err(|_| InvalidInput::Rate)?;
    if (MIN_RATE..=MAX_RATE).contains(&rate) {
        Ok(rate)
    } else {
        Err(InvalidInput::Rate)
    }
}

pub fn parse_mode(input: &str) -> Result<Mode, InvalidInput> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "s" => Ok(Mode::Speak),
        "r" => Ok(Mode::Record),
        "b" => Ok(Mode::Both),
        _ => Err(InvalidInput::Mode),
    }
}

pub fn parse_save_format(input: &str) -> Result<SaveFormat, InvalidInput> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "wav" => Ok(SaveFormat::Wav),
        "mp3" => Ok(SaveFormat::Mp3),
        _ => Err(InvalidInput::Format),
    }
}
