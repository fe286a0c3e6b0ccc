use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("could not open audio file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("audio file {path} is not playable: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[error("no audio output device available")]
    Device,
}

/// Queued playback over the default output device at full volume. Files
/// appended with [`Speaker::queue`] play back to back;
/// [`Speaker::wait_until_done`] blocks until the queue drains.
pub struct Speaker {
    _stream: OutputStream,
    sink: Sink,
}

impl Speaker {
    pub fn new() -> Result<Self, PlaybackError> {
        let (stream, handle) = OutputStream::try_default().map_err(|_| PlaybackError::Device)?;
        let sink = Sink::try_new(&handle).map_err(|_| PlaybackError::Device)?;
        sink.set_volume(1.0);
        Ok(Self {
            _stream: stream,
            sink,
        })
    }

    pub fn queue(&self, path: &Path) -> Result<(), PlaybackError> {
        let file = File::open(path).map_err(|source| PlaybackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|source| PlaybackError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        self.sink.append(decoder);
        Ok(())
    }

    pub fn wait_until_done(&self) {
        self.sink.sleep_until_end();
    }
}
