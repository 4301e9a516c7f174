//! Sound-File Playback Backends
//!
//! Real audio output through rodio, behind the `playback` feature. Two
//! backends with observably different pause behavior:
//!
//! - [`SinkBackend`] keeps the sink for the life of the request and offers
//!   true pause/resume.
//! - [`OneShotBackend`] is the fire-and-forget path: it can only start and
//!   stop. Pausing through it loses the position, so the controller records
//!   the pause and restarts the track on resume.

use crate::backend::PlaybackBackend;
use crate::{CdAudioError, Result};
use log::debug;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn open_output() -> Result<OutputStreamHandle> {
    let (stream, handle) = OutputStream::try_default()
        .map_err(|e| CdAudioError::Backend(format!("no audio output device: {e}")))?;
    // The stream owns the OS audio device and is not Send; the sink keeps
    // playing as long as it lives. Leak it so the backend itself stays Send.
    std::mem::forget(stream);
    Ok(handle)
}

fn open_sink(handle: &OutputStreamHandle, path: &Path) -> Result<Sink> {
    let file = File::open(path)
        .map_err(|e| CdAudioError::Backend(format!("open {}: {e}", path.display())))?;
    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| CdAudioError::Backend(format!("decode {}: {e}", path.display())))?;
    let sink = Sink::try_new(handle)
        .map_err(|e| CdAudioError::Backend(format!("audio sink: {e}")))?;
    sink.append(source);
    sink.play();
    Ok(sink)
}

/// Backend with a held sink and true pause support.
#[derive(Default)]
pub struct SinkBackend {
    handle: Option<OutputStreamHandle>,
    sink: Option<Sink>,
}

impl SinkBackend {
    /// Create a backend; the audio device is opened lazily on first play.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlaybackBackend for SinkBackend {
    fn begin(&mut self, path: &Path) -> Result<()> {
        self.halt();
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => open_output()?,
        };
        let sink = open_sink(&handle, path);
        self.handle = Some(handle);
        self.sink = Some(sink?);
        debug!("sink backend playing {}", path.display());
        Ok(())
    }

    fn halt(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn supports_pause(&self) -> bool {
        true
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
        }
    }
}

/// Fire-and-forget backend without pause support.
///
/// The sink is retained only so a stop request can be honored; no other
/// control is possible once a track starts.
#[derive(Default)]
pub struct OneShotBackend {
    handle: Option<OutputStreamHandle>,
    sink: Option<Sink>,
}

impl OneShotBackend {
    /// Create a backend; the audio device is opened lazily on first play.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlaybackBackend for OneShotBackend {
    fn begin(&mut self, path: &Path) -> Result<()> {
        self.halt();
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => open_output()?,
        };
        let sink = open_sink(&handle, path);
        self.handle = Some(handle);
        self.sink = Some(sink?);
        debug!("one-shot backend playing {}", path.display());
        Ok(())
    }

    fn halt(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn supports_pause(&self) -> bool {
        false
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}
}
