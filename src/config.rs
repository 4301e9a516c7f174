//! Emulator Configuration
//!
//! Serde-backed configuration for the emulated device: where track files
//! live, how tracks are discovered, and which playback backend renders
//! them. Loadable from JSON by the CLI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the track catalog is populated at session open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DiscoveryPolicy {
    /// Probe the root path for `track02.wav` .. `track99.wav` and estimate
    /// durations from file sizes.
    Scan,
    /// Assume a fixed number of tracks at a flat duration without touching
    /// the filesystem. Matches the lightweight backend of the original
    /// device, which never scanned.
    Assume {
        /// Number of consecutive audio tracks, starting at track 2.
        #[serde(default = "default_assumed_tracks")]
        tracks: u8,
        /// Reported duration of every assumed track, in milliseconds.
        #[serde(default = "default_track_len_ms")]
        track_len_ms: u32,
    },
}

fn default_assumed_tracks() -> u8 {
    18
}

fn default_track_len_ms() -> u32 {
    180_000
}

impl Default for DiscoveryPolicy {
    fn default() -> Self {
        DiscoveryPolicy::Scan
    }
}

impl DiscoveryPolicy {
    /// The fixed-assumption policy with its stock defaults.
    pub fn assume_default() -> Self {
        DiscoveryPolicy::Assume {
            tracks: default_assumed_tracks(),
            track_len_ms: default_track_len_ms(),
        }
    }
}

/// Which playback backend renders track files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Inert backend; commands are accepted but nothing is audible.
    #[default]
    Null,
    /// Held-sink backend with true pause/resume (`playback` feature).
    Sink,
    /// Fire-and-forget backend without pause support (`playback` feature).
    OneShot,
}

/// Configuration for one emulated device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmuConfig {
    /// Root path where track files are located.
    pub root_path: PathBuf,
    /// Track discovery policy.
    pub discovery: DiscoveryPolicy,
    /// Playback backend selection.
    pub backend: BackendChoice,
}

impl Default for EmuConfig {
    fn default() -> Self {
        EmuConfig {
            // Stock drive-letter root of the original device.
            root_path: PathBuf::from("D:/"),
            discovery: DiscoveryPolicy::default(),
            backend: BackendChoice::default(),
        }
    }
}

impl EmuConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults.
    pub fn from_json_file(path: &std::path::Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            crate::CdAudioError::Config(format!("{}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EmuConfig::default();
        assert_eq!(config.root_path, PathBuf::from("D:/"));
        assert_eq!(config.discovery, DiscoveryPolicy::Scan);
        assert_eq!(config.backend, BackendChoice::Null);
    }

    #[test]
    fn test_assume_defaults_from_json() {
        let config: EmuConfig =
            serde_json::from_str(r#"{ "discovery": { "mode": "assume" } }"#).unwrap();
        assert_eq!(
            config.discovery,
            DiscoveryPolicy::Assume {
                tracks: 18,
                track_len_ms: 180_000
            }
        );
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emu.json");
        std::fs::write(&path, r#"{ "root_path": "/mnt/disc", "backend": "sink" }"#).unwrap();

        let config = EmuConfig::from_json_file(&path).unwrap();
        assert_eq!(config.root_path, PathBuf::from("/mnt/disc"));
        assert_eq!(config.backend, BackendChoice::Sink);
        assert_eq!(config.discovery, DiscoveryPolicy::Scan);

        assert!(EmuConfig::from_json_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_full_round_trip() {
        let config = EmuConfig {
            root_path: PathBuf::from("/mnt/disc"),
            discovery: DiscoveryPolicy::Assume {
                tracks: 4,
                track_len_ms: 60_000,
            },
            backend: BackendChoice::OneShot,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EmuConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.root_path, config.root_path);
        assert_eq!(back.discovery, config.discovery);
        assert_eq!(back.backend, BackendChoice::OneShot);
    }
}
