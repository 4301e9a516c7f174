//! Track Catalog
//!
//! Discovers which logical track slots have a backing audio file under the
//! configured root path and records an estimated duration per track. The
//! catalog is built once per open and is read-only until the session closes.
//!
//! Track 1 on a mixed-mode disc is data, so audio slots run from 2 to 99
//! and slot 1 is never scanned or reported.

use crate::config::DiscoveryPolicy;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Highest addressable track slot.
pub const MAX_TRACKS: u8 = 99;

/// First audio track. Track 1 is data.
pub const FIRST_AUDIO_TRACK: u8 = 2;

/// Assumed byte rate of a track file: uncompressed 44.1kHz 16-bit stereo,
/// 176400 bytes per second, rounded to 176 bytes per millisecond. Duration
/// derived from this is an estimate, not a decode; exact duration would
/// have to come from the real audio format.
pub const BYTES_PER_MS: u64 = 176;

/// Per-slot catalog entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackInfo {
    /// Whether a backing file was found (or assumed) for this slot.
    pub exists: bool,
    /// Estimated length in milliseconds; 0 when absent.
    pub duration_ms: u32,
}

/// Probes the filesystem for track files.
///
/// Split out as a trait so catalog and dispatcher tests can run against a
/// fake filesystem instead of touching disk.
pub trait FileProbe: Send + Sync {
    /// Size in bytes of the file at `path`, or `None` if it does not exist.
    fn file_size(&self, path: &Path) -> Option<u64>;
}

/// Real filesystem probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl FileProbe for FsProbe {
    fn file_size(&self, path: &Path) -> Option<u64> {
        fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
    }
}

/// File name of a track slot, e.g. track 4 -> `track04.wav`.
pub fn track_file_name(track: u8) -> String {
    format!("track{:02}.wav", track)
}

/// Full path of a track slot under the root.
pub fn track_path(root: &Path, track: u8) -> PathBuf {
    root.join(track_file_name(track))
}

/// Mapping from track slot to existence and estimated duration.
#[derive(Debug, Clone)]
pub struct TrackCatalog {
    // Indexed by slot number; entries 0 and 1 stay unused.
    tracks: Vec<TrackInfo>,
    num_tracks: u8,
}

impl TrackCatalog {
    /// Build a catalog for `root` according to the discovery policy.
    pub fn build(policy: &DiscoveryPolicy, root: &Path, probe: &dyn FileProbe) -> Self {
        match policy {
            DiscoveryPolicy::Scan => Self::scan(root, probe),
            DiscoveryPolicy::Assume {
                tracks,
                track_len_ms,
            } => Self::assume(*tracks, *track_len_ms),
        }
    }

    /// Scan `root` for `track02.wav` through `track99.wav`.
    pub fn scan(root: &Path, probe: &dyn FileProbe) -> Self {
        let mut tracks = vec![TrackInfo::default(); MAX_TRACKS as usize + 1];
        let mut num_tracks = 0;

        for track in FIRST_AUDIO_TRACK..=MAX_TRACKS {
            let path = track_path(root, track);
            if let Some(size) = probe.file_size(&path) {
                let duration_ms = (size / BYTES_PER_MS) as u32;
                tracks[track as usize] = TrackInfo {
                    exists: true,
                    duration_ms,
                };
                num_tracks = track;
                debug!(
                    "found track {} at {} (est. {} ms)",
                    track,
                    path.display(),
                    duration_ms
                );
            }
        }

        debug!("scan complete, {} tracks", num_tracks);
        TrackCatalog { tracks, num_tracks }
    }

    /// Assume a fixed number of consecutive tracks without touching the
    /// filesystem, each reported at a flat default duration.
    pub fn assume(count: u8, track_len_ms: u32) -> Self {
        let mut tracks = vec![TrackInfo::default(); MAX_TRACKS as usize + 1];
        let last = FIRST_AUDIO_TRACK
            .saturating_add(count.saturating_sub(1))
            .min(MAX_TRACKS);
        let mut num_tracks = 0;

        if count > 0 {
            for track in FIRST_AUDIO_TRACK..=last {
                tracks[track as usize] = TrackInfo {
                    exists: true,
                    duration_ms: track_len_ms,
                };
            }
            num_tracks = last;
        }

        debug!("assumed {} tracks at {} ms each", num_tracks, track_len_ms);
        TrackCatalog { tracks, num_tracks }
    }

    /// Highest slot number found, or 0 when no tracks exist.
    pub fn num_tracks(&self) -> u8 {
        self.num_tracks
    }

    /// Whether any tracks exist at all.
    pub fn media_present(&self) -> bool {
        self.num_tracks > 0
    }

    /// Whether a backing file exists for `track`.
    pub fn exists(&self, track: u8) -> bool {
        (FIRST_AUDIO_TRACK..=MAX_TRACKS).contains(&track) && self.tracks[track as usize].exists
    }

    /// Estimated length of `track` in milliseconds, 0 when absent.
    pub fn length_ms(&self, track: u8) -> u32 {
        if self.exists(track) {
            self.tracks[track as usize].duration_ms
        } else {
            0
        }
    }

    /// Sum of the estimated lengths of all existing tracks.
    pub fn total_length_ms(&self) -> u32 {
        (FIRST_AUDIO_TRACK..=self.num_tracks)
            .map(|t| self.length_ms(t))
            .sum()
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::FakeProbe;
    use super::*;

    #[test]
    fn test_track_file_names() {
        assert_eq!(track_file_name(2), "track02.wav");
        assert_eq!(track_file_name(4), "track04.wav");
        assert_eq!(track_file_name(99), "track99.wav");
    }

    #[test]
    fn test_scan_reports_highest_found() {
        let root = Path::new("/disc");
        let probe = FakeProbe::with_tracks(root, &[(2, 176_000), (3, 352_000), (5, 88_000)]);
        let catalog = TrackCatalog::scan(root, &probe);

        assert_eq!(catalog.num_tracks(), 5);
        assert!(catalog.exists(2));
        assert!(catalog.exists(3));
        assert!(!catalog.exists(4));
        assert!(catalog.exists(5));
        assert_eq!(catalog.length_ms(4), 0);
    }

    #[test]
    fn test_scan_duration_estimate() {
        let root = Path::new("/disc");
        let probe = FakeProbe::with_tracks(root, &[(2, 1_764_000)]);
        let catalog = TrackCatalog::scan(root, &probe);

        // 1,764,000 bytes / 176 bytes-per-ms = 10,022 ms
        assert_eq!(catalog.length_ms(2), 10_022);
        assert_eq!(catalog.total_length_ms(), 10_022);
    }

    #[test]
    fn test_empty_scan_has_no_media() {
        let root = Path::new("/disc");
        let probe = FakeProbe::default();
        let catalog = TrackCatalog::scan(root, &probe);

        assert_eq!(catalog.num_tracks(), 0);
        assert!(!catalog.media_present());
        assert_eq!(catalog.total_length_ms(), 0);
    }

    #[test]
    fn test_track_one_is_never_audio() {
        let root = Path::new("/disc");
        // A stray track01.wav must not be picked up.
        let probe = FakeProbe::with_tracks(root, &[(1, 176_000), (2, 176_000)]);
        let catalog = TrackCatalog::scan(root, &probe);

        assert!(!catalog.exists(1));
        assert_eq!(catalog.length_ms(1), 0);
        assert_eq!(catalog.num_tracks(), 2);
    }

    #[test]
    fn test_assume_policy() {
        let catalog = TrackCatalog::assume(18, 180_000);

        assert_eq!(catalog.num_tracks(), 19); // tracks 2..=19
        assert!(catalog.exists(2));
        assert!(catalog.exists(19));
        assert!(!catalog.exists(20));
        assert_eq!(catalog.length_ms(10), 180_000);
        assert_eq!(catalog.total_length_ms(), 18 * 180_000);
    }

    #[test]
    fn test_assume_zero_tracks() {
        let catalog = TrackCatalog::assume(0, 180_000);
        assert_eq!(catalog.num_tracks(), 0);
        assert!(!catalog.media_present());
    }

    #[test]
    fn test_assume_clamps_at_highest_slot() {
        let catalog = TrackCatalog::assume(120, 1_000);
        assert_eq!(catalog.num_tracks(), MAX_TRACKS);
        assert!(catalog.exists(MAX_TRACKS));
    }

    #[test]
    fn test_scan_real_directory() {
        let dir = tempfile::tempdir().unwrap();
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        // Half a second of silence in track02.wav.
        let path = track_path(dir.path(), 2);
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..(44_100 / 2) {
            writer.write_sample(0i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let catalog = TrackCatalog::scan(dir.path(), &FsProbe);
        assert_eq!(catalog.num_tracks(), 2);
        assert!(catalog.exists(2));
        // Byte-size estimate lands near the real 500 ms.
        let est = catalog.length_ms(2);
        assert!((450..=560).contains(&est), "estimate {} ms out of range", est);
    }
}
