use std::{
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("source file {0} does not exist")]
    SourceMissing(PathBuf),
    #[error("failed to run ffmpeg: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("ffmpeg exited with status {0}")]
    Ffmpeg(ExitStatus),
    #[error("ffmpeg reported success but {0} was not created")]
    OutputMissing(PathBuf),
}

/// Find ffmpeg via the `PDF2AUDIO_FFMPEG_PATH` override or the PATH.
/// `None` means mp3 output is unavailable for this run.
pub fn locate_ffmpeg() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("PDF2AUDIO_FFMPEG_PATH") {
        let candidate = PathBuf::from(path);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    which::which("ffmpeg").ok()
}

/// Convert one WAV file to an MP3 alongside it, blocking until ffmpeg
/// exits. The WAV source is left in place.
pub fn convert_wav_to_mp3(ffmpeg: &Path, wav_path: &Path) -> Result<PathBuf, EncodeError> {
    if !wav_path.exists() {
        return Err(EncodeError::SourceMissing(wav_path.to_path_buf()));
    }
    let mp3_path = wav_path.with_extension("mp3");

    let status = Command::new(ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(wav_path)
        .arg(&mp3_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if !status.success() {
        return Err(EncodeError::Ffmpeg(status));
    }
    if !mp3_path.exists() {
        return Err(EncodeError::OutputMissing(mp3_path));
    }

    info!("converted {} to {}", wav_path.display(), mp3_path.display());
    Ok(mp3_path)
}
