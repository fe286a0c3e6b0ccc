//! Piper subprocess synthesis. One [`Synthesizer`] is constructed per
//! pipeline phase from the immutable settings; instances are never shared
//! between the recording and speaking passes.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use log::warn;
use shlex::Shlex;
use thiserror::Error;

use crate::settings::{TtsSettings, DEFAULT_RATE};
use crate::voices::VoiceInfo;

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("voice model not found at {0}")]
    ModelMissing(PathBuf),
    #[error("piper is not available; set PDF2AUDIO_PIPER_COMMAND, bundle it under runtime/piper, or install python with the piper module")]
    EngineMissing,
    #[error("failed to launch piper: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("piper exited with status {status}: {stderr}")]
    Engine { status: i32, stderr: String },
    #[error("{0}")]
    Other(String),
}

pub struct Synthesizer {
    program: OsString,
    base_args: Vec<OsString>,
    model_path: PathBuf,
    length_scale: f32,
}

impl Synthesizer {
    pub fn new(voice: &VoiceInfo, settings: &TtsSettings) -> Result<Self, SynthError> {
        if !voice.model_path.exists() {
            return Err(SynthError::ModelMissing(voice.model_path.clone()));
        }
        let (program, base_args) = resolve_command()?;
        Ok(Self {
            program,
            base_args,
            model_path: voice.model_path.clone(),
            length_scale: length_scale(settings.rate),
        })
    }

    /// Synthesize `text` into a WAV file at `output_path`, blocking until
    /// the subprocess exits.
    pub fn synthesize_to_file(&self, text: &str, output_path: &Path) -> Result<(), SynthError> {
        if let Some(parent) = output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|err| {
                SynthError::Other(format!(
                    "unable to create output directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let mut command = Command::new(&self.program);
        command.args(&self.base_args);
        command.arg("--model").arg(&self.model_path);
        command.arg("--output_file").arg(output_path);
        command.arg("--length_scale").arg(self.length_scale.to_string());

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;
        {
            use std::io::Write;
            let stdin = child
                .stdin
                .as_mut()
                .ok_or_else(|| SynthError::Other("failed to access piper stdin".into()))?;
            stdin
                .write_all(text.as_bytes())
                .map_err(|err| SynthError::Other(err.to_string()))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|err| SynthError::Other(err.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SynthError::Engine {
                status: output.status.code().unwrap_or_default(),
                stderr,
            });
        }

        if !output_path.exists() {
            warn!(
                "piper succeeded but the expected output {} was not created",
                output_path.display()
            );
        }
        Ok(())
    }
}

/// Map the user-facing words-per-minute rate onto Piper's length scale.
/// The default rate plays at scale 1.0; faster rates shrink the scale.
pub fn length_scale(rate: u16) -> f32 {
    f32::from(DEFAULT_RATE) / f32::from(rate)
}

fn resolve_command() -> Result<(OsString, Vec<OsString>), SynthError> {
    if let Some(raw) = std::env::var_os("PDF2AUDIO_PIPER_COMMAND") {
        let raw = raw.to_string_lossy().into_owned();
        let mut parts: Vec<String> = Shlex::new(&raw).collect();
        if parts.is_empty() {
            return Err(SynthError::EngineMissing);
        }
        let program = parts.remove(0);
        return Ok((program.into(), parts.into_iter().map(Into::into).collect()));
    }

    let bundled = runtime_dir()
        .join("piper")
        .join(if cfg!(windows) { "piper.exe" } else { "piper" });
    if bundled.exists() {
        return Ok((bundled.into_os_string(), Vec::new()));
    }

    for python in ["python3", "python"] {
        if which::which(python).is_ok() {
            return Ok((python.into(), vec!["-m".into(), "piper".into()]));
        }
    }

    Err(SynthError::EngineMissing)
}

fn runtime_dir() -> PathBuf {
    std::env::var_os("PDF2AUDIO_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("runtime"))
}
