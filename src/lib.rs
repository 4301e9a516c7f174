//! CD-Audio Device Emulation
//!
//! Emulates a removable-media audio-control device: callers issue the
//! fixed command vocabulary of the classic CD-audio control interface
//! (open, play, stop, pause, resume, seek, status, capabilities, set time
//! format) against numbered tracks, and the device answers as if a disc
//! were present while actually playing `track02.wav` .. `track99.wav`
//! from a configured root path. Track 1 is data, never audio.
//!
//! # Features
//! - Full command dispatch with fall-through for messages that are not
//!   ours, so a host router can try its other device handlers
//! - Packed track/minute/second/frame and plain track-index position
//!   formats, selectable per session
//! - Track discovery by directory scan (duration estimated from file
//!   size) or by fixed assumption without touching the filesystem
//! - Pluggable playback backends; true pause and fire-and-forget
//!   variants behind the `playback` feature
//!
//! # Crate feature flags
//! - `playback` (opt-in): real audio output through the sound-file
//!   backends (enables the optional `rodio` dep)
//!
//! # Quick start
//! ```no_run
//! use cdaudio::{
//!     CdAudio, CommandFlags, DeviceId, EmuConfig, OpenParams, Opcode, Params, PlayParams,
//! };
//!
//! let device = CdAudio::new(EmuConfig::default());
//! let id = DeviceId(1);
//!
//! let mut open = Params::Open(OpenParams { device_id: id });
//! device.handle_command(id, Opcode::Open as u32, CommandFlags::empty(), Some(&mut open));
//!
//! let mut play = Params::Play(PlayParams { from: 2, to: 0 });
//! device.handle_command(id, Opcode::Play as u32, CommandFlags::FROM, Some(&mut play));
//! ```

#![warn(missing_docs)]

pub mod backend; // Playback backend abstraction
pub mod catalog; // Track discovery
pub mod command; // Command vocabulary
pub mod config; // Emulator configuration
pub mod controller; // Playback state machine
pub mod dispatch; // Command dispatch
#[cfg(feature = "playback")]
pub mod playback; // Sound-file backends (rodio)
pub mod session; // Device session
pub mod tmsf; // Packed position encoding

/// Error types for device emulation operations
#[derive(thiserror::Error, Debug)]
pub enum CdAudioError {
    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Playback backend error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for CdAudioError {
    fn from(msg: String) -> Self {
        CdAudioError::Other(msg)
    }
}

impl From<&str> for CdAudioError {
    fn from(msg: &str) -> Self {
        CdAudioError::Other(msg.to_string())
    }
}

/// Result type for device emulation operations
pub type Result<T> = std::result::Result<T, CdAudioError>;

// Public API exports
pub use backend::{NullBackend, PlaybackBackend};
pub use catalog::{
    track_file_name, track_path, FileProbe, FsProbe, TrackCatalog, TrackInfo, FIRST_AUDIO_TRACK,
    MAX_TRACKS,
};
pub use command::{
    is_cdaudio_device_type, is_cdaudio_device_type_id, CapItem, CommandFlags, DevCapsParams,
    ModeCode, Opcode, OpenParams, Params, PlayParams, ResultCode, SeekParams, SetParams,
    StatusItem, StatusParams, DEVTYPE_CD_AUDIO, TRACK_TYPE_AUDIO,
};
pub use config::{BackendChoice, DiscoveryPolicy, EmuConfig};
pub use controller::{PlaybackController, PlaybackState};
pub use dispatch::{CdAudio, Outcome};
#[cfg(feature = "playback")]
pub use playback::{OneShotBackend, SinkBackend};
pub use session::{DeviceId, DeviceSession};
pub use tmsf::{decode_position, encode_position, TimeFormat, Tmsf};
