//! Packed Position Encoding
//!
//! Positions cross the command surface in one of two formats: a packed
//! track/minute/second/frame word (TMSF) or a plain track index. This
//! emulation never models sub-track positioning, so minute, second and
//! frame are always zero on output and ignored on input.

use serde::{Deserialize, Serialize};

/// Position encoding selected per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    /// Packed track/minute/second/frame word.
    #[default]
    Tmsf,
    /// Plain track index, no packing.
    TrackIndex,
}

impl TimeFormat {
    /// Numeric code reported by the time-format status query.
    pub fn code(self) -> u32 {
        match self {
            TimeFormat::Tmsf => 10,
            TimeFormat::TrackIndex => 0,
        }
    }

    /// Decode a format code from the set-time-format command.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            10 => Some(TimeFormat::Tmsf),
            0 => Some(TimeFormat::TrackIndex),
            _ => None,
        }
    }
}

/// Packed track/minute/second/frame position word.
///
/// Layout: track in bits 0..8, minute in 8..16, second in 16..24, frame
/// in 24..32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tmsf(u32);

impl Tmsf {
    /// Pack a bare track position. Sub-track fields are zero.
    pub fn from_track(track: u8) -> Self {
        Tmsf(track as u32)
    }

    /// Wrap a raw packed word.
    pub fn from_raw(raw: u32) -> Self {
        Tmsf(raw)
    }

    /// The raw packed word.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Track field (bits 0..8).
    pub fn track(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Minute field (bits 8..16).
    pub fn minute(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Second field (bits 16..24).
    pub fn second(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Frame field (bits 24..32).
    pub fn frame(self) -> u8 {
        ((self.0 >> 24) & 0xFF) as u8
    }
}

/// Encode a track position into the session's time format.
pub fn encode_position(format: TimeFormat, track: u8) -> u32 {
    match format {
        TimeFormat::Tmsf => Tmsf::from_track(track).raw(),
        TimeFormat::TrackIndex => track as u32,
    }
}

/// Extract the track index from a caller-supplied position word.
///
/// Under TMSF the minute/second/frame fields are discarded; only the
/// track byte is meaningful here.
pub fn decode_position(format: TimeFormat, raw: u32) -> u8 {
    match format {
        TimeFormat::Tmsf => Tmsf::from_raw(raw).track(),
        TimeFormat::TrackIndex => (raw & 0xFF) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_fields() {
        let pos = Tmsf::from_raw(0x0403_0205);
        assert_eq!(pos.track(), 5);
        assert_eq!(pos.minute(), 2);
        assert_eq!(pos.second(), 3);
        assert_eq!(pos.frame(), 4);
    }

    #[test]
    fn test_from_track_zeroes_subfields() {
        let pos = Tmsf::from_track(17);
        assert_eq!(pos.track(), 17);
        assert_eq!(pos.minute(), 0);
        assert_eq!(pos.second(), 0);
        assert_eq!(pos.frame(), 0);
        assert_eq!(pos.raw(), 17);
    }

    #[test]
    fn test_round_trip_all_audio_tracks() {
        for track in 2u8..=99 {
            assert_eq!(
                decode_position(TimeFormat::Tmsf, encode_position(TimeFormat::Tmsf, track)),
                track
            );
            assert_eq!(
                decode_position(
                    TimeFormat::TrackIndex,
                    encode_position(TimeFormat::TrackIndex, track)
                ),
                track
            );
        }
    }

    #[test]
    fn test_decode_discards_subfields() {
        // Minute/second/frame in the word must not disturb the track.
        let raw = 0x1F10_0C07;
        assert_eq!(decode_position(TimeFormat::Tmsf, raw), 7);
    }

    #[test]
    fn test_format_codes() {
        assert_eq!(TimeFormat::from_code(10), Some(TimeFormat::Tmsf));
        assert_eq!(TimeFormat::from_code(0), Some(TimeFormat::TrackIndex));
        assert_eq!(TimeFormat::from_code(3), None);
        assert_eq!(TimeFormat::Tmsf.code(), 10);
    }
}
