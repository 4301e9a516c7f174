//! Playback Backend Abstraction
//!
//! The controller never renders audio itself; it hands file paths to a
//! backend and trusts it to play them asynchronously. Two real backends
//! exist behind the `playback` feature (see [`crate::playback`]): one
//! holding a sink with true pause support, one fire-and-forget. They differ
//! observably, so the choice is configuration, not an implementation
//! detail.

use crate::Result;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Common interface for audio playback backends.
///
/// All requests return immediately; rendering happens asynchronously
/// inside the backend. There is no completion callback: the device never
/// learns that a track finished.
pub trait PlaybackBackend: Send {
    /// Start rendering the file at `path`, replacing any current playback.
    fn begin(&mut self, path: &Path) -> Result<()>;

    /// Stop rendering. Idempotent; a halt with nothing playing is a no-op.
    fn halt(&mut self);

    /// Whether this backend can pause and later resume at the same
    /// position. Backends without true pause get halted instead, and the
    /// position is lost.
    fn supports_pause(&self) -> bool;

    /// Pause rendering, keeping position. Only meaningful when
    /// [`supports_pause`](Self::supports_pause) is true; otherwise a no-op.
    fn pause(&mut self);

    /// Resume paused rendering. Only meaningful when
    /// [`supports_pause`](Self::supports_pause) is true; otherwise a no-op.
    fn resume(&mut self);
}

/// Everything a [`NullBackend`] has been asked to do.
#[derive(Debug, Default, Clone)]
pub struct RequestLog {
    /// Paths handed to `begin`, in order.
    pub begun: Vec<PathBuf>,
    /// Number of `halt` requests.
    pub halts: usize,
    /// Number of `pause` requests.
    pub pauses: usize,
    /// Number of `resume` requests.
    pub resumes: usize,
}

/// Inert backend: accepts every request and records it.
///
/// The stock backend for builds without the `playback` feature, and the
/// test double everywhere else.
pub struct NullBackend {
    log: Arc<Mutex<RequestLog>>,
    with_pause: bool,
    reject: bool,
}

impl NullBackend {
    /// A silent backend with true pause support.
    pub fn new() -> Self {
        NullBackend {
            log: Arc::new(Mutex::new(RequestLog::default())),
            with_pause: true,
            reject: false,
        }
    }

    /// A silent backend that reports no pause capability, mirroring the
    /// fire-and-forget playback path.
    pub fn without_pause() -> Self {
        NullBackend {
            with_pause: false,
            ..Self::new()
        }
    }

    /// A silent backend that rejects every `begin` request.
    pub fn rejecting() -> Self {
        NullBackend {
            reject: true,
            ..Self::new()
        }
    }

    /// Shared handle onto the request log, valid after the backend has
    /// been moved into a controller.
    pub fn log_handle(&self) -> Arc<Mutex<RequestLog>> {
        Arc::clone(&self.log)
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackBackend for NullBackend {
    fn begin(&mut self, path: &Path) -> Result<()> {
        if self.reject {
            return Err(crate::CdAudioError::Backend(format!(
                "refused to play {}",
                path.display()
            )));
        }
        self.log.lock().begun.push(path.to_path_buf());
        Ok(())
    }

    fn halt(&mut self) {
        self.log.lock().halts += 1;
    }

    fn supports_pause(&self) -> bool {
        self.with_pause
    }

    fn pause(&mut self) {
        self.log.lock().pauses += 1;
    }

    fn resume(&mut self) {
        self.log.lock().resumes += 1;
    }
}
