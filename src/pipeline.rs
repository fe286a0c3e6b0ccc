//! The run pipeline: pick a PDF, extract its text, collect settings, then
//! drive the recording and speaking passes. Each pass constructs its own
//! engine instance from the same immutable settings; nothing is reused
//! across phases.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;
use thiserror::Error;

use crate::{
    encode, pdf, picker,
    piper::Synthesizer,
    playback::Speaker,
    prompts,
    settings::{SaveFormat, TtsSettings},
    text,
    voices::{VoiceInfo, VoiceLibrary},
};

#[derive(Debug, Error)]
pub enum Abort {
    #[error("no PDF selected; exiting")]
    Cancelled,
    #[error("no extractable text found in this PDF; if it is a scanned (image-only) document it needs OCR first")]
    NoExtractableText,
}

pub fn run() -> Result<()> {
    let pdf_path = picker::pick_pdf().ok_or(Abort::Cancelled)?;
    println!("Selected: {}", pdf_path.display());

    let extracted = pdf::extract_text(&pdf_path)?;
    if extracted.is_empty() {
        return Err(Abort::NoExtractableText.into());
    }
    println!("Total chars: {}", extracted.chars().count());

    let library = VoiceLibrary::from_env();
    let ffmpeg = encode::locate_ffmpeg();
    let settings = {
        let stdin = io::stdin();
        let stdout = io::stdout();
        prompts::collect_settings(
            &mut stdin.lock(),
            &mut stdout.lock(),
            &library.list(),
            ffmpeg.is_some(),
        )
        .context("failed to read settings from the console")?
    };
    let voice = library.resolve(settings.voice_id.as_deref())?;
    info!(
        "voice {} at rate {} in {:?} mode",
        voice.id, settings.rate, settings.mode
    );

    let stem = pdf_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let out_dir = output_dir();

    let mut saved_files = Vec::new();
    if settings.mode.records() {
        println!("\nRecording (saving audio chunks)...");
        saved_files = record_pass(
            &settings,
            &voice,
            &extracted,
            &stem,
            &out_dir,
            ffmpeg.as_deref(),
        )?;
    }

    if settings.mode.speaks() {
        println!("\nSpeaking...");
        speak_pass(&settings, &voice, &extracted)?;
    }

    report_saved(&mut io::stdout().lock(), &out_dir, &saved_files)?;
    Ok(())
}

/// Write one numbered audio file per chunk, then transcode the lot when
/// mp3 was requested. Transcoding failure aborts the run; files written
/// before the failure stay on disk.
fn record_pass(
    settings: &TtsSettings,
    voice: &VoiceInfo,
    extracted: &str,
    stem: &str,
    out_dir: &Path,
    ffmpeg: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let synthesizer = Synthesizer::new(voice, settings)?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("unable to create output directory {}", out_dir.display()))?;

    let mut wav_files = Vec::new();
    for (index, chunk) in text::chunk_text(extracted, text::MAX_CHUNK_CHARS)
        .iter()
        .enumerate()
    {
        let path = out_dir.join(format!("{stem}_part{:03}.wav", index + 1));
        synthesizer
            .synthesize_to_file(chunk, &path)
            .with_context(|| format!("failed to record chunk {}", index + 1))?;
        info!("wrote {}", path.display());
        wav_files.push(path);
    }

    if settings.save_format == SaveFormat::Mp3 {
        let ffmpeg = ffmpeg.context("mp3 was requested but ffmpeg is not available")?;
        println!("Converting to MP3 (ffmpeg)...");
        let mut mp3_files = Vec::new();
        for wav_path in &wav_files {
            let mp3_path = encode::convert_wav_to_mp3(ffmpeg, wav_path)
                .with_context(|| format!("failed to convert {}", wav_path.display()))?;
            mp3_files.push(mp3_path);
        }
        return Ok(mp3_files);
    }

    Ok(wav_files)
}

/// Synthesize every chunk into a scratch directory, queue them all on one
/// sink, and block until playback finishes. Uses a fresh engine instance
/// even when a recording pass already ran.
fn speak_pass(settings: &TtsSettings, voice: &VoiceInfo, extracted: &str) -> Result<()> {
    let synthesizer = Synthesizer::new(voice, settings)?;
    let speaker = Speaker::new()?;
    let scratch = tempfile::tempdir().context("unable to create scratch directory")?;

    for (index, chunk) in text::chunk_text(extracted, text::MAX_CHUNK_CHARS)
        .iter()
        .enumerate()
    {
        let path = scratch.path().join(format!("speech_{:03}.wav", index + 1));
        synthesizer
            .synthesize_to_file(chunk, &path)
            .with_context(|| format!("failed to synthesize chunk {}", index + 1))?;
        speaker.queue(&path)?;
    }

    speaker.wait_until_done();
    Ok(())
}

fn report_saved<W: Write>(output: &mut W, out_dir: &Path, files: &[PathBuf]) -> io::Result<()> {
    if files.is_empty() {
        return Ok(());
    }
    writeln!(output, "\nSaved {} file(s) in: {}", files.len(), out_dir.display())?;
    for file in files.iter().take(10) {
        if let Some(name) = file.file_name() {
            writeln!(output, " - {}", name.to_string_lossy())?;
        }
    }
    if files.len() > 10 {
        writeln!(output, " ...")?;
    }
    Ok(())
}

fn output_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("PDF2AUDIO_OUTPUT_DIR") {
        return PathBuf::from(dir);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("output_audio")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn report_lists_every_file_up_to_ten() {
        let files: Vec<PathBuf> = (1..=3).map(|i| PathBuf::from(format!("a_part00{i}.wav"))).collect();
        let mut output = Vec::new();
        report_saved(&mut output, Path::new("out"), &files).unwrap();
        let report = String::from_utf8(output).unwrap();
        assert!(report.contains("Saved 3 file(s)"));
        assert!(report.contains("a_part001.wav"));
        assert!(report.contains("a_part003.wav"));
        assert!(!report.contains("..."));
    }

    #[test]
    fn report_truncates_after_ten_files() {
        let files: Vec<PathBuf> = (1..=12)
            .map(|i| PathBuf::from(format!("book_part{i:03}.wav")))
            .collect();
        let mut output = Vec::new();
        report_saved(&mut output, Path::new("out"), &files).unwrap();
        let report = String::from_utf8(output).unwrap();
        assert!(report.contains("Saved 12 file(s)"));
        assert!(report.contains("book_part010.wav"));
        assert!(!report.contains("book_part011.wav"));
        assert!(report.contains(" ..."));
    }

    #[test]
    fn report_is_silent_when_nothing_was_saved() {
        let mut output = Vec::new();
        report_saved(&mut output, Path::new("out"), &[]).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    #[serial]
    fn output_directory_honours_the_environment_override() {
        std::env::set_var("PDF2AUDIO_OUTPUT_DIR", "/tmp/elsewhere");
        assert_eq!(output_dir(), PathBuf::from("/tmp/elsewhere"));
        std::env::remove_var("PDF2AUDIO_OUTPUT_DIR");
        assert!(output_dir().ends_with("output_audio"));
    }
}
