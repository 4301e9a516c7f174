//! Playback State Machine
//!
//! Owns the stopped/playing/paused state and drives the backend. Every
//! operation is synchronous and returns before any audio happens; the
//! backend renders asynchronously and nothing reports back when a track
//! ends.
//!
//! Invalid-state calls (pausing while stopped, resuming while playing) are
//! deliberate no-ops: the device never answers "wrong state".

use crate::backend::PlaybackBackend;
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Current playback state, with the track being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing is being rendered.
    #[default]
    Stopped,
    /// A track is being rendered.
    Playing(u8),
    /// A track is paused. Under a backend without true pause the audio is
    /// already gone and only the state remembers the track.
    Paused(u8),
}

/// Drives start/stop/pause/resume against a playback backend.
pub struct PlaybackController {
    backend: Box<dyn PlaybackBackend>,
    state: PlaybackState,
    // Path of the last started track, for restart-on-resume under
    // backends without true pause.
    current_file: Option<PathBuf>,
}

impl PlaybackController {
    /// Wrap a backend. Starts out stopped.
    pub fn new(backend: Box<dyn PlaybackBackend>) -> Self {
        PlaybackController {
            backend,
            state: PlaybackState::Stopped,
            current_file: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Start rendering `track` from `file`, stopping any current playback
    /// first. `None` means the track has no backing file: the stop still
    /// happens, nothing starts, and the controller stays `Stopped`.
    ///
    /// Returns whether playback actually started. A missing file or a
    /// backend refusal never leaves a partial playing state.
    pub fn start(&mut self, track: u8, file: Option<&Path>) -> bool {
        self.stop();

        let Some(path) = file else {
            debug!("track {} has no backing file, staying stopped", track);
            return false;
        };

        match self.backend.begin(path) {
            Ok(()) => {
                self.state = PlaybackState::Playing(track);
                self.current_file = Some(path.to_path_buf());
                debug!("playing track {} from {}", track, path.display());
                true
            }
            Err(e) => {
                warn!("backend refused track {}: {}", track, e);
                self.state = PlaybackState::Stopped;
                false
            }
        }
    }

    /// Stop rendering. Idempotent; stopping while stopped is a no-op.
    pub fn stop(&mut self) {
        match self.state {
            PlaybackState::Playing(_) | PlaybackState::Paused(_) => {
                self.backend.halt();
                self.state = PlaybackState::Stopped;
                self.current_file = None;
            }
            PlaybackState::Stopped => {}
        }
    }

    /// Pause rendering. Only meaningful while playing.
    ///
    /// Backends without true pause get a hard halt instead; the state still
    /// records `Paused`, but the position inside the track is lost and a
    /// later resume restarts from the beginning.
    pub fn pause(&mut self) {
        if let PlaybackState::Playing(track) = self.state {
            if self.backend.supports_pause() {
                self.backend.pause();
            } else {
                self.backend.halt();
            }
            self.state = PlaybackState::Paused(track);
        }
    }

    /// Resume rendering. Only meaningful while paused.
    ///
    /// Under a backend without true pause the current track restarts from
    /// its beginning. The transition to `Playing` happens even if the
    /// restart fails, matching the device's silent-degradation policy.
    pub fn resume(&mut self) {
        if let PlaybackState::Paused(track) = self.state {
            if self.backend.supports_pause() {
                self.backend.resume();
            } else if let Some(path) = self.current_file.clone() {
                if let Err(e) = self.backend.begin(&path) {
                    warn!("restart of track {} failed: {}", track, e);
                }
            }
            self.state = PlaybackState::Playing(track);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NullBackend;

    fn track_file() -> PathBuf {
        PathBuf::from("/disc/track02.wav")
    }

    #[test]
    fn test_start_transitions_to_playing() {
        let backend = NullBackend::new();
        let log = backend.log_handle();
        let mut ctl = PlaybackController::new(Box::new(backend));

        assert!(ctl.start(2, Some(&track_file())));
        assert_eq!(ctl.state(), PlaybackState::Playing(2));
        assert_eq!(log.lock().begun.len(), 1);
    }

    #[test]
    fn test_start_missing_file_stays_stopped() {
        let backend = NullBackend::new();
        let log = backend.log_handle();
        let mut ctl = PlaybackController::new(Box::new(backend));

        assert!(!ctl.start(7, None));
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(log.lock().begun.is_empty());
    }

    #[test]
    fn test_start_backend_refusal_stays_stopped() {
        let mut ctl = PlaybackController::new(Box::new(NullBackend::rejecting()));
        assert!(!ctl.start(2, Some(&track_file())));
        assert_eq!(ctl.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_start_stops_previous_playback() {
        let backend = NullBackend::new();
        let log = backend.log_handle();
        let mut ctl = PlaybackController::new(Box::new(backend));

        ctl.start(2, Some(&track_file()));
        ctl.start(3, Some(Path::new("/disc/track03.wav")));
        assert_eq!(ctl.state(), PlaybackState::Playing(3));
        // Implicit stop between the two starts.
        assert_eq!(log.lock().halts, 1);
        assert_eq!(log.lock().begun.len(), 2);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let backend = NullBackend::new();
        let log = backend.log_handle();
        let mut ctl = PlaybackController::new(Box::new(backend));

        ctl.start(2, Some(&track_file()));
        ctl.stop();
        ctl.stop();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert_eq!(log.lock().halts, 1);
    }

    #[test]
    fn test_true_pause_and_resume() {
        let backend = NullBackend::new();
        let log = backend.log_handle();
        let mut ctl = PlaybackController::new(Box::new(backend));

        ctl.start(2, Some(&track_file()));
        ctl.pause();
        assert_eq!(ctl.state(), PlaybackState::Paused(2));
        ctl.resume();
        assert_eq!(ctl.state(), PlaybackState::Playing(2));

        let log = log.lock();
        assert_eq!(log.pauses, 1);
        assert_eq!(log.resumes, 1);
        assert_eq!(log.begun.len(), 1);
    }

    #[test]
    fn test_pause_fallback_halts_and_resume_restarts() {
        let backend = NullBackend::without_pause();
        let log = backend.log_handle();
        let mut ctl = PlaybackController::new(Box::new(backend));

        ctl.start(2, Some(&track_file()));
        ctl.pause();
        assert_eq!(ctl.state(), PlaybackState::Paused(2));

        ctl.resume();
        assert_eq!(ctl.state(), PlaybackState::Playing(2));

        let log = log.lock();
        // Pause went through halt, resume through a fresh begin.
        assert_eq!(log.pauses, 0);
        assert_eq!(log.halts, 1);
        assert_eq!(log.begun, vec![track_file(), track_file()]);
    }

    #[test]
    fn test_invalid_state_calls_are_no_ops() {
        let backend = NullBackend::new();
        let log = backend.log_handle();
        let mut ctl = PlaybackController::new(Box::new(backend));

        ctl.pause();
        ctl.resume();
        assert_eq!(ctl.state(), PlaybackState::Stopped);

        ctl.start(2, Some(&track_file()));
        ctl.resume(); // playing, not paused
        assert_eq!(ctl.state(), PlaybackState::Playing(2));

        let log = log.lock();
        assert_eq!(log.pauses, 0);
        assert_eq!(log.resumes, 0);
    }
}
