//! Playback Events
//!
//! Event-based communication for UI synchronization. Events are emitted at key
//! points:
//! - State changes (loading/playing/paused/idle)
//! - Track changes (as soon as a load is issued, before it completes)
//! - Queue and mode changes
//! - Load failures and the end of a failing skip chain

use crate::types::{PlaybackState, RepeatMode};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// The current track changed
    ///
    /// Emitted when the load is issued, so the UI reflects intent before the
    /// engine has finished loading.
    TrackChanged {
        /// ID of the new (current) track, `None` when nothing is loaded
        track_id: Option<String>,
        /// ID of the previous track (if any)
        previous_track_id: Option<String>,
    },

    /// Track finished playing naturally (reached end)
    TrackFinished {
        /// ID of the finished track
        track_id: String,
    },

    /// Queue changed (tracks added/removed/reordered/replaced)
    QueueChanged {
        /// New queue length
        length: usize,
        /// New cursor position
        current_index: Option<usize>,
    },

    /// Shuffle or repeat mode changed
    ModeChanged { shuffle: bool, repeat: RepeatMode },

    /// Volume changed
    VolumeChanged {
        /// New volume (0.0-1.0)
        volume: f32,
    },

    /// A track could not be loaded and was skipped
    LoadFailed {
        /// ID of the skipped track
        track_id: String,
        /// Why the load failed
        reason: String,
    },

    /// Every remaining track failed to load; playback stopped
    NothingPlayable,
}
