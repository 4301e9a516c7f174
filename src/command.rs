//! Command Surface
//!
//! The raw vocabulary of the control interface: message numbers, flag
//! bits, parameter blocks and item selectors, all carrying the constants
//! of the original device protocol so existing callers route cleanly.

use crate::session::DeviceId;
use crate::tmsf::TimeFormat;
use bitflags::bitflags;
use num_derive::FromPrimitive;

/// Device-type code answered by the device-type capability query.
pub const DEVTYPE_CD_AUDIO: u32 = 516;

/// Track-type code answered by the track-type status query. Every track
/// this device reports is audio.
pub const TRACK_TYPE_AUDIO: u32 = 1088;

/// Recognized command messages, by their raw protocol numbers.
///
/// Raw words that decode to `None` are not ours; the dispatcher reports
/// them unhandled so the host can fall through to a default handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum Opcode {
    /// Open a session on the device.
    Open = 0x0803,
    /// Close the session, stopping playback.
    Close = 0x0804,
    /// Start playback of a track range.
    Play = 0x0806,
    /// Move the track cursor without playing.
    Seek = 0x0807,
    /// Stop playback.
    Stop = 0x0808,
    /// Pause playback.
    Pause = 0x0809,
    /// Device description query. Recognized but deliberately left to the
    /// host's default handler.
    Info = 0x080A,
    /// Static capability query.
    GetDevCaps = 0x080B,
    /// Set session parameters (time format).
    Set = 0x080D,
    /// Status query.
    Status = 0x0814,
    /// Resume paused playback.
    Resume = 0x0855,
}

bitflags! {
    /// Flag word selecting which optional parameters are present.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandFlags: u32 {
        /// Caller wants an asynchronous completion notice. Accepted and
        /// ignored; this device never notifies.
        const NOTIFY = 0x0001;
        /// Caller wants the command to block until done. All handlers
        /// return immediately anyway.
        const WAIT = 0x0002;
        /// The `from` position of a play request is present.
        const FROM = 0x0004;
        /// The `to` position of a play or seek request is present.
        const TO = 0x0008;
        /// The `track` field of a status request is present.
        const TRACK = 0x0010;
        /// The item selector of a status or capability request is present.
        const ITEM = 0x0100;
        /// The time-format field of a set request is present.
        const SET_TIME_FORMAT = 0x0400;
    }
}

/// Status query item selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum StatusItem {
    /// Length of one track (with the TRACK flag) or of the whole disc.
    Length = 1,
    /// Position of the cursor, or of a given track (TRACK flag).
    Position = 2,
    /// Number of tracks on the disc.
    NumberOfTracks = 3,
    /// Playback mode code.
    Mode = 4,
    /// Whether media is present.
    MediaPresent = 5,
    /// Current time format code.
    TimeFormat = 6,
    /// Whether the device is ready. Always yes.
    Ready = 7,
    /// The track cursor as a plain number.
    CurrentTrack = 8,
    /// Track type; every track here is audio.
    TypeTrack = 0x4001,
}

/// Capability query item selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum CapItem {
    /// Recording support. No.
    CanRecord = 1,
    /// Audio output. Yes.
    HasAudio = 2,
    /// Video output. No.
    HasVideo = 3,
    /// Device type code.
    DeviceType = 4,
    /// Whether the device operates on caller-named files. No.
    UsesFiles = 5,
    /// Whether this is a compound device. No.
    CompoundDevice = 6,
    /// Eject support. No.
    CanEject = 7,
    /// Playback support. Yes.
    CanPlay = 8,
    /// Save support. No.
    CanSave = 9,
}

/// Playback mode codes answered by the mode status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum ModeCode {
    /// Nothing playing.
    Stopped = 525,
    /// A track is playing.
    Playing = 526,
    /// Playback is paused.
    Paused = 529,
}

/// Result of a handled command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    /// The command was carried out (including the silent no-op cases).
    Success,
    /// Open was issued while a session is already open.
    DeviceAlreadyOpen,
    /// A command that needs a parameter block was issued without one.
    NullParameterBlock,
}

impl ResultCode {
    /// Whether this code means the command went through.
    pub fn is_success(self) -> bool {
        self == ResultCode::Success
    }
}

/// Parameter block of an open request. The device id is echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenParams {
    /// Caller-assigned id for the new session; echoed back on success.
    pub device_id: DeviceId,
}

/// Parameter block of a play request. Positions are interpreted in the
/// session's current time format when their flag is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayParams {
    /// Start position (FROM flag).
    pub from: u32,
    /// End position (TO flag). Advisory only; the device does not advance
    /// through a range.
    pub to: u32,
}

/// Parameter block of a seek request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeekParams {
    /// Target position (TO flag), in the session's time format.
    pub to: u32,
}

/// Parameter block of a status query. `ret` is the out slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusParams {
    /// Item selector (ITEM flag).
    pub item: u32,
    /// Track of interest (TRACK flag).
    pub track: u32,
    /// Answer slot, filled by the handler.
    pub ret: u32,
}

/// Parameter block of a set request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetParams {
    /// Raw time-format code (SET_TIME_FORMAT flag). Codes other than the
    /// packed format select the plain track index, as the original did.
    pub time_format: u32,
}

/// Parameter block of a capability query. `ret` is the out slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DevCapsParams {
    /// Item selector (ITEM flag).
    pub item: u32,
    /// Answer slot, filled by the handler.
    pub ret: u32,
}

/// In/out parameter block, one variant per parameterized opcode.
///
/// Commands that require a block and receive `None` (or the wrong
/// variant) answer [`ResultCode::NullParameterBlock`].
#[derive(Debug, PartialEq, Eq)]
pub enum Params {
    /// Block for [`Opcode::Open`].
    Open(OpenParams),
    /// Block for [`Opcode::Play`].
    Play(PlayParams),
    /// Block for [`Opcode::Seek`].
    Seek(SeekParams),
    /// Block for [`Opcode::Status`].
    Status(StatusParams),
    /// Block for [`Opcode::Set`].
    Set(SetParams),
    /// Block for [`Opcode::GetDevCaps`].
    DevCaps(DevCapsParams),
}

/// Decode a raw time-format code the way the original device did: the
/// packed format when asked for, the plain track index for everything
/// else.
pub fn time_format_from_raw(code: u32) -> TimeFormat {
    TimeFormat::from_code(code).unwrap_or(TimeFormat::TrackIndex)
}

/// Whether a device-type string names this device.
pub fn is_cdaudio_device_type(device_type: &str) -> bool {
    device_type.eq_ignore_ascii_case("cdaudio")
}

/// Whether a numeric device-type word names this device.
pub fn is_cdaudio_device_type_id(device_type: u32) -> bool {
    device_type == DEVTYPE_CD_AUDIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn test_opcode_decoding() {
        assert_eq!(Opcode::from_u32(0x0803), Some(Opcode::Open));
        assert_eq!(Opcode::from_u32(0x0806), Some(Opcode::Play));
        assert_eq!(Opcode::from_u32(0x0814), Some(Opcode::Status));
        assert_eq!(Opcode::from_u32(0x0855), Some(Opcode::Resume));
        // Not part of the vocabulary: falls through to the host.
        assert_eq!(Opcode::from_u32(0x0812), None);
    }

    #[test]
    fn test_status_item_decoding() {
        assert_eq!(StatusItem::from_u32(4), Some(StatusItem::Mode));
        assert_eq!(StatusItem::from_u32(0x4001), Some(StatusItem::TypeTrack));
        assert_eq!(StatusItem::from_u32(0xDEAD), None);
    }

    #[test]
    fn test_flag_bits() {
        let flags = CommandFlags::FROM | CommandFlags::TO;
        assert!(flags.contains(CommandFlags::FROM));
        assert!(!flags.contains(CommandFlags::TRACK));
        assert_eq!(flags.bits(), 0x0C);
    }

    #[test]
    fn test_time_format_from_raw() {
        assert_eq!(time_format_from_raw(10), TimeFormat::Tmsf);
        assert_eq!(time_format_from_raw(0), TimeFormat::TrackIndex);
        // Unknown codes behave as the plain index, as the original did.
        assert_eq!(time_format_from_raw(99), TimeFormat::TrackIndex);
    }

    #[test]
    fn test_device_type_matching() {
        assert!(is_cdaudio_device_type("cdaudio"));
        assert!(is_cdaudio_device_type("CDAudio"));
        assert!(!is_cdaudio_device_type("waveaudio"));
        assert!(is_cdaudio_device_type_id(DEVTYPE_CD_AUDIO));
        assert!(!is_cdaudio_device_type_id(522));
    }
}
