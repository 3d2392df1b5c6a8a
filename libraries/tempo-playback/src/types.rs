//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tempo_core::TrackRef;

/// Controller state
///
/// `Idle` → `Loading` → `Playing` ⇄ `Paused`. A failed load moves on to another
/// `Loading` attempt or ends in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing is loaded
    #[default]
    Idle,

    /// Load issued, waiting for the audio engine
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Next mode in the UI cycle: off → all → one → off
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Token identifying one load issued to the audio engine
///
/// Tokens increase monotonically. Only the most recent one is honoured when a
/// load completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// A load the driver must hand to the audio engine
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub id: RequestId,
    pub track: TrackRef,
    pub resource: PathBuf,
}

/// Read model handed to the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub current_track: Option<TrackRef>,
    pub is_playing: bool,
    pub current_time: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub queue: Vec<TrackRef>,
    pub current_index: Option<usize>,
    pub up_next: Vec<TrackRef>,
}

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Past this position "previous" restarts the current track (default: 3000)
    #[serde(default = "default_restart_threshold_ms")]
    pub restart_threshold_ms: u64,

    /// Initial shuffle flag (default: false)
    #[serde(default)]
    pub shuffle: bool,

    /// Initial repeat mode (default: Off)
    #[serde(default)]
    pub repeat: RepeatMode,

    /// Initial volume, 0.0-1.0 (default: 0.8)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Fixed seed for the shuffle generator; random when unset
    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    /// Capacity of the command mailbox (default: 64)
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Capacity of the event broadcast channel (default: 256)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl ControllerConfig {
    pub fn restart_threshold(&self) -> Duration {
        Duration::from_millis(self.restart_threshold_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(crate::PlaybackError::Config(format!(
                "volume must be within 0.0-1.0, got {}",
                self.volume
            )));
        }

        if self.command_buffer == 0 || self.event_buffer == 0 {
            return Err(crate::PlaybackError::Config(
                "channel capacities must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_restart_threshold_ms() -> u64 {
    3000
}

fn default_volume() -> f32 {
    0.8
}

fn default_command_buffer() -> usize {
    64
}

fn default_event_buffer() -> usize {
    256
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            restart_threshold_ms: default_restart_threshold_ms(),
            shuffle: false,
            repeat: RepeatMode::Off,
            volume: default_volume(),
            shuffle_seed: None,
            command_buffer: default_command_buffer(),
            event_buffer: default_event_buffer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.restart_threshold(), Duration::from_secs(3));
        assert_eq!(config.volume, 0.8);
        assert!(!config.shuffle);
        assert_eq!(config.repeat, RepeatMode::Off);
        assert!(config.shuffle_seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn repeat_cycles_off_all_one() {
        assert_eq!(RepeatMode::Off.cycle(), RepeatMode::All);
        assert_eq!(RepeatMode::All.cycle(), RepeatMode::One);
        assert_eq!(RepeatMode::One.cycle(), RepeatMode::Off);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{ "repeat": "all", "shuffle_seed": 7 }"#).unwrap();

        assert_eq!(config.repeat, RepeatMode::All);
        assert_eq!(config.shuffle_seed, Some(7));
        assert_eq!(config.restart_threshold_ms, 3000);
        assert_eq!(config.command_buffer, 64);
    }

    #[test]
    fn out_of_range_volume_rejected() {
        let config = ControllerConfig {
            volume: 1.5,
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
