//! Device Session
//!
//! The single open instance of the emulated device. A session is built
//! whole on open (fresh catalog, cursor at the first audio track, stock
//! time format) and torn down whole on close; there are no partial states.

use crate::backend::PlaybackBackend;
use crate::catalog::{track_path, FileProbe, TrackCatalog, FIRST_AUDIO_TRACK};
use crate::command::ModeCode;
use crate::config::EmuConfig;
use crate::controller::{PlaybackController, PlaybackState};
use crate::tmsf::TimeFormat;
use log::debug;
use std::path::{Path, PathBuf};

/// Opaque session identifier, assigned by the caller at open time and
/// echoed back; later commands must present it to reach this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u32);

/// The open session: catalog snapshot, playback controller, track cursor
/// and per-session settings.
pub struct DeviceSession {
    device_id: DeviceId,
    root_path: PathBuf,
    catalog: TrackCatalog,
    controller: PlaybackController,
    current_track: u8,
    start_track: u8,
    end_track: u8,
    time_format: TimeFormat,
}

impl DeviceSession {
    /// Open a session: build the catalog per the configured policy and
    /// reset the cursor to the first audio track.
    pub fn open(
        device_id: DeviceId,
        config: &EmuConfig,
        probe: &dyn FileProbe,
        backend: Box<dyn PlaybackBackend>,
    ) -> Self {
        let catalog = TrackCatalog::build(&config.discovery, &config.root_path, probe);
        debug!(
            "session {:?} open, {} tracks under {}",
            device_id,
            catalog.num_tracks(),
            config.root_path.display()
        );

        DeviceSession {
            device_id,
            root_path: config.root_path.clone(),
            catalog,
            controller: PlaybackController::new(backend),
            current_track: FIRST_AUDIO_TRACK,
            start_track: FIRST_AUDIO_TRACK,
            end_track: FIRST_AUDIO_TRACK,
            time_format: TimeFormat::default(),
        }
    }

    /// Force-stop playback ahead of teardown.
    pub fn shutdown(&mut self) {
        self.controller.stop();
        debug!("session {:?} closed", self.device_id);
    }

    /// The caller-assigned session identifier.
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    /// The catalog snapshot taken at open.
    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    /// The session's position encoding.
    pub fn time_format(&self) -> TimeFormat {
        self.time_format
    }

    /// Replace the session's position encoding.
    pub fn set_time_format(&mut self, format: TimeFormat) {
        self.time_format = format;
    }

    /// The track cursor.
    pub fn current_track(&self) -> u8 {
        self.current_track
    }

    /// Bounds of the most recently requested play range.
    pub fn play_range(&self) -> (u8, u8) {
        (self.start_track, self.end_track)
    }

    /// Path of `track` under the root, if it has a backing file.
    fn backing_file(&self, track: u8) -> Option<PathBuf> {
        if self.catalog.exists(track) {
            Some(track_path(&self.root_path, track))
        } else {
            None
        }
    }

    /// Play from `from`, recording `to` as the advisory end of range.
    ///
    /// The cursor and range update even when `from` has no backing file;
    /// in that case nothing becomes audible and the device stays stopped.
    pub fn play(&mut self, from: u8, to: u8) {
        self.current_track = from;
        self.start_track = from;
        self.end_track = to;

        let file = self.backing_file(from);
        self.controller.start(from, file.as_deref());
    }

    /// Stop playback.
    pub fn stop(&mut self) {
        self.controller.stop();
    }

    /// Pause playback (no-op unless playing).
    pub fn pause(&mut self) {
        self.controller.pause();
    }

    /// Resume playback (no-op unless paused).
    pub fn resume(&mut self) {
        self.controller.resume();
    }

    /// Move the cursor without touching playback.
    pub fn seek(&mut self, track: u8) {
        self.current_track = track;
        debug!("seek to track {}", track);
    }

    /// Playback mode code for status queries.
    pub fn mode(&self) -> ModeCode {
        match self.controller.state() {
            PlaybackState::Stopped => ModeCode::Stopped,
            PlaybackState::Playing(_) => ModeCode::Playing,
            PlaybackState::Paused(_) => ModeCode::Paused,
        }
    }

    /// Root path the session was opened against.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NullBackend;
    use crate::catalog::FsProbe;
    use crate::config::DiscoveryPolicy;

    fn assumed_session(tracks: u8) -> DeviceSession {
        let config = EmuConfig {
            discovery: DiscoveryPolicy::Assume {
                tracks,
                track_len_ms: 1_000,
            },
            ..EmuConfig::default()
        };
        DeviceSession::open(DeviceId(1), &config, &FsProbe, Box::new(NullBackend::new()))
    }

    #[test]
    fn test_open_resets_cursor_and_format() {
        let session = assumed_session(5);
        assert_eq!(session.current_track(), FIRST_AUDIO_TRACK);
        assert_eq!(session.time_format(), TimeFormat::Tmsf);
        assert_eq!(session.catalog().num_tracks(), 6);
    }

    #[test]
    fn test_play_updates_cursor_even_without_file() {
        let mut session = assumed_session(0);
        session.play(7, 9);
        assert_eq!(session.current_track(), 7);
        assert_eq!(session.play_range(), (7, 9));
        assert_eq!(session.mode(), ModeCode::Stopped);
    }

    #[test]
    fn test_seek_does_not_touch_playback() {
        let mut session = assumed_session(0);
        session.seek(42);
        assert_eq!(session.current_track(), 42);
        assert_eq!(session.mode(), ModeCode::Stopped);
    }
}
