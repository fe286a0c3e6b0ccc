//! Interactive settings collection on the console. Each prompt wraps one
//! of the pure parsers in [`crate::settings`] and re-asks until it gets a
//! valid answer. Everything is collected before any synthesis starts.

use std::io::{self, BufRead, Write};

use crate::settings::{
    parse_mode, parse_rate, parse_save_format, parse_voice_choice, InvalidInput, Mode, SaveFormat,
    TtsSettings, DEFAULT_RATE,
};
use crate::voices::VoiceInfo;

pub fn collect_settings<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    voices: &[VoiceInfo],
    ffmpeg_available: bool,
) -> io::Result<TtsSettings> {
    let voice_id = choose_voice(input, output, voices)?;
    let rate = prompt_loop(
        input,
        output,
        &format!("Choose speed/rate (default {DEFAULT_RATE}, higher=faster): "),
        parse_rate,
    )?;
    let mode = choose_mode(input, output)?;

    let save_format = if mode.records() && ffmpeg_available {
        choose_save_format(input, output)?
    } else {
        SaveFormat::Wav
    };

    Ok(TtsSettings {
        voice_id,
        rate,
        mode,
        save_format,
    })
}

fn choose_voice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    voices: &[VoiceInfo],
) -> io::Result<Option<String>> {
    if voices.is_empty() {
        writeln!(output, "No voices found. Using the default voice.")?;
        return Ok(None);
    }

    writeln!(output, "\nAvailable voices:")?;
    for (index, voice) in voices.iter().enumerate() {
        writeln!(output, "  [{index}] {}", voice.label)?;
    }

    let choice = prompt_loop(
        input,
        output,
        "\nChoose a voice number (Enter for default): ",
        |raw| parse_voice_choice(raw, voices.len()),
    )?;
    Ok(choice.map(|index| voices[index].id.clone()))
}

fn choose_mode<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Mode> {
    writeln!(output, "\nMode options:")?;
    writeln!(output, "  S = Speak only (no saving)")?;
    writeln!(output, "  R = Record only (save audio, no speaking)")?;
    writeln!(output, "  B = Both (speak + save)")?;
    prompt_loop(input, output, "Choose mode [S/R/B] (default S): ", parse_mode)
}

fn choose_save_format<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<SaveFormat> {
    writeln!(output, "\nSave format options:")?;
    writeln!(output, "  wav = Universal, but bigger files")?;
    writeln!(output, "  mp3 = Smaller files (ffmpeg detected)")?;
    prompt_loop(
        input,
        output,
        "Choose save format [wav/mp3] (default wav): ",
        parse_save_format,
    )
}

/// Print `prompt`, read one line, and hand it to `parse`. Invalid input
/// prints the complaint and asks again; end of input falls back to the
/// blank-input default.
fn prompt_loop<R, W, T, F>(input: &mut R, output: &mut W, prompt: &str, parse: F) -> io::Result<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Result<T, InvalidInput>,
{
    loop {
        write!(output, "{prompt}")?;
        output.flush()?;

        let mut line = String::new();
        let bytes_read = input.read_line(&mut line)?;
        match parse(line.trim()) {
            Ok(value) => return Ok(value),
            Err(err) if bytes_read == 0 => {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, err.to_string()))
            }
            Err(err) => writeln!(output, "{err}")?,
        }
    }
}
